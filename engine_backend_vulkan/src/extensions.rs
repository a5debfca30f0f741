/// Instance extension and layer negotiation
///
/// Intersects what the engine wants (build-mode dependent) and what external
/// collaborators require with what the host actually reports, producing the
/// final enable-lists used at instance creation.

use std::collections::BTreeSet;
use engine_backend::backend::{BuildMode, Error, Result};
use engine_backend::{engine_info, engine_warn, engine_error};

/// Set of extension identifiers (case-sensitive, no duplicates, ordered)
pub type ExtensionSet = BTreeSet<String>;

/// Debug-only diagnostics extension (messenger + object naming)
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

/// Extension exposed by the validation layer to configure its features
pub const VALIDATION_FEATURES_EXTENSION: &str = "VK_EXT_validation_features";

/// Surface extension every windowing system requires
pub const SURFACE_EXTENSION: &str = "VK_KHR_surface";

/// Layers attempted in debug builds
pub const DESIRED_LAYERS: &[&str] = &["VK_LAYER_KHRONOS_validation"];

/// Validation layer whose extension list is probed for validation features
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Extensions the engine itself wants for a build mode
pub fn desired_instance_extensions(mode: BuildMode) -> ExtensionSet {
    let mut desired = ExtensionSet::new();
    if mode.is_debug() {
        desired.insert(DEBUG_UTILS_EXTENSION.to_string());
    }
    desired
}

/// Intersect `desired ∪ required` with the extensions the host reports
///
/// Zero-length names reported by the host are skipped.
pub fn negotiate_instance_extensions<S: AsRef<str>>(
    available: &[S],
    desired: &ExtensionSet,
    required: &ExtensionSet,
) -> ExtensionSet {
    available
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .filter(|name| desired.contains(*name) || required.contains(*name))
        .map(str::to_string)
        .collect()
}

/// Externally required extensions the host does not provide
///
/// Reported as a warning only. The missing names are left out of instance
/// creation, which still succeeds; the failure surfaces later when a
/// collaborator needs them (e.g. `create_surface`).
pub fn missing_required_extensions(required: &ExtensionSet, negotiated: &ExtensionSet) -> Vec<String> {
    required.difference(negotiated).cloned().collect()
}

/// Result of validation layer negotiation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerNegotiation {
    /// Layers to enable, in `DESIRED_LAYERS` order
    pub enabled_layers: Vec<String>,
    /// The validation layer reports the validation-features extension
    pub validation_features_supported: bool,
}

/// Pick the desired layers the host reports
///
/// `validation_layer_extensions` is only consulted when the validation layer
/// was enabled; it is the extension list the host reports for that layer.
pub fn negotiate_layers<S: AsRef<str>, F>(
    available_layers: &[S],
    validation_layer_extensions: F,
) -> Result<LayerNegotiation>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    let enabled_layers: Vec<String> = DESIRED_LAYERS
        .iter()
        .filter(|desired| available_layers.iter().any(|layer| layer.as_ref() == **desired))
        .map(|desired| desired.to_string())
        .collect();

    if enabled_layers.is_empty() {
        engine_warn!(
            "backend::vulkan",
            "Validation layer not available; did you install the Vulkan SDK? \
             Please ensure that VK_LAYER_PATH is set correctly."
        );
        return Ok(LayerNegotiation::default());
    }

    let validation_features_supported = if enabled_layers.iter().any(|l| l == VALIDATION_LAYER) {
        validation_layer_extensions()?
            .iter()
            .any(|ext| ext == VALIDATION_FEATURES_EXTENSION)
    } else {
        false
    };

    engine_info!(
        "backend::vulkan",
        "Enabled layers: {:?} (validation features: {})",
        enabled_layers,
        validation_features_supported
    );

    Ok(LayerNegotiation {
        enabled_layers,
        validation_features_supported,
    })
}

/// Final instance extension list: validation features (when supported) plus negotiated set
pub fn enabled_instance_extensions(negotiated: &ExtensionSet, layers: &LayerNegotiation) -> ExtensionSet {
    let mut enabled = negotiated.clone();
    if layers.validation_features_supported {
        enabled.insert(VALIDATION_FEATURES_EXTENSION.to_string());
    }
    enabled
}

/// A release build must never enable debug-only extensions
pub fn check_build_mode_invariant(mode: BuildMode, enabled: &ExtensionSet) -> Result<()> {
    if mode == BuildMode::Release {
        for debug_only in [DEBUG_UTILS_EXTENSION, VALIDATION_FEATURES_EXTENSION] {
            if enabled.contains(debug_only) {
                let message = format!("{} must not be enabled in release build", debug_only);
                engine_error!("backend::vulkan", "{}", message);
                return Err(Error::InvariantViolation(message));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "extensions_tests.rs"]
mod tests;
