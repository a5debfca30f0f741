/// Surface helpers for the windowing collaborator
///
/// The window system reports which instance extensions it needs to create a
/// drawable surface; those feed `PlatformConfig::required_extensions`.

use std::ffi::CStr;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use engine_backend::backend::{Error, Result};
use engine_backend::engine_err;

use crate::extensions::ExtensionSet;

/// Instance extensions required to create surfaces on `display`
pub fn required_surface_extensions<D: HasDisplayHandle + ?Sized>(display: &D) -> Result<ExtensionSet> {
    let raw_display = display
        .display_handle()
        .map_err(|e| Error::BackendError(format!("Display handle unavailable: {}", e)))?
        .as_raw();

    let names = ash_window::enumerate_required_extensions(raw_display)
        .map_err(|e| engine_err!("backend::vulkan", "Unsupported window system: {:?}", e))?;

    // ash-window hands out pointers to static, NUL-terminated extension names
    Ok(names
        .iter()
        .map(|&name| unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
        .collect())
}

/// Raw display and window handles of a native window
pub(crate) fn raw_handles<W>(window: &W) -> Result<(RawDisplayHandle, RawWindowHandle)>
where
    W: HasWindowHandle + HasDisplayHandle + ?Sized,
{
    let display = window
        .display_handle()
        .map_err(|e| Error::BackendError(format!("Display handle unavailable: {}", e)))?
        .as_raw();
    let window = window
        .window_handle()
        .map_err(|e| Error::BackendError(format!("Window handle unavailable: {}", e)))?
        .as_raw();
    Ok((display, window))
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
