//! Unit tests for PlatformFactory
//!
//! Factory creation does not touch the host; no GPU required.

use crate::factory::PlatformFactory;
use crate::mock_host::MockHost;
use crate::vulkan_platform::VulkanPlatform;
use engine_backend::backend::{Backend, BuildMode, Platform, PlatformConfig, PlatformState};

#[test]
fn test_create_returns_uninitialized_vulkan_platform() {
    let platform = PlatformFactory::create();
    assert_eq!(platform.backend(), Backend::Vulkan);
    assert_eq!(platform.state(), PlatformState::Uninitialized);
}

#[test]
fn test_create_with_config_keeps_config() {
    let config = PlatformConfig::default()
        .with_app_name("Factory Test")
        .with_build_mode(BuildMode::Release);
    let platform = PlatformFactory::create_vulkan(config);
    assert_eq!(platform.config().app_name, "Factory Test");
    assert_eq!(platform.config().build_mode, BuildMode::Release);
}

#[test]
fn test_destroy_clears_handle() {
    let mut handle = Some(PlatformFactory::create());
    PlatformFactory::destroy(&mut handle);
    assert!(handle.is_none());
}

#[test]
fn test_destroy_twice_is_a_no_op() {
    let mut handle = Some(PlatformFactory::create());
    PlatformFactory::destroy(&mut handle);
    PlatformFactory::destroy(&mut handle);
    assert!(handle.is_none());
}

#[test]
fn test_round_trip_create_and_destroy_counts_match() {
    let host = MockHost::new();
    let log = host.call_log();
    let platform = VulkanPlatform::with_host(host, PlatformConfig::default().with_build_mode(BuildMode::Debug))
        .with_compiled_mode(BuildMode::Debug);
    let mut handle: Option<Box<dyn Platform>> = Some(Box::new(platform));

    if let Some(platform) = handle.as_mut() {
        let mut driver = platform.create_driver();
        driver.terminate();
    }
    PlatformFactory::destroy(&mut handle);

    let created = log.count_matching(|c| matches!(c, crate::mock_host::HostCall::CreateInstance(_)));
    let destroyed = log.count(&crate::mock_host::HostCall::DestroyInstance);
    assert_eq!(created, 1);
    assert_eq!(created, destroyed);
    assert!(handle.is_none());
}
