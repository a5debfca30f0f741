//! Unit tests for config.rs
//!
//! Tests BuildMode, ApiVersion comparison and PlatformConfig defaults/builders.

use crate::config::{ApiVersion, BuildMode, DebugSeverity, PlatformConfig, QueueCapability};

// ============================================================================
// BUILD MODE TESTS
// ============================================================================

#[test]
fn test_build_mode_matches_compilation() {
    let expected = if cfg!(debug_assertions) || cfg!(feature = "validation") {
        BuildMode::Debug
    } else {
        BuildMode::Release
    };
    assert_eq!(BuildMode::current(), expected);
}

#[test]
fn test_build_mode_is_debug() {
    assert!(BuildMode::Debug.is_debug());
    assert!(!BuildMode::Release.is_debug());
}

#[test]
fn test_release_compilation_clamps_to_release() {
    assert_eq!(BuildMode::Debug.clamp_to(BuildMode::Release), BuildMode::Release);
    assert_eq!(BuildMode::Release.clamp_to(BuildMode::Release), BuildMode::Release);
}

#[test]
fn test_debug_compilation_honors_configured_mode() {
    assert_eq!(BuildMode::Debug.clamp_to(BuildMode::Debug), BuildMode::Debug);
    assert_eq!(BuildMode::Release.clamp_to(BuildMode::Debug), BuildMode::Release);
}

// ============================================================================
// API VERSION TESTS
// ============================================================================

#[test]
fn test_api_version_satisfies_same_version() {
    assert!(ApiVersion::V1_1.satisfies(ApiVersion::V1_1));
}

#[test]
fn test_api_version_minor_below_minimum() {
    assert!(!ApiVersion::V1_0.satisfies(ApiVersion::V1_1));
}

#[test]
fn test_api_version_higher_major_ignores_minor() {
    // 2.0 satisfies 1.3 even though 0 < 3
    assert!(ApiVersion::new(2, 0, 0).satisfies(ApiVersion::V1_3));
}

#[test]
fn test_api_version_lower_major_fails() {
    assert!(!ApiVersion::new(0, 9, 0).satisfies(ApiVersion::V1_1));
}

#[test]
fn test_api_version_patch_ignored() {
    assert!(ApiVersion::new(1, 1, 0).satisfies(ApiVersion::new(1, 1, 200)));
}

#[test]
fn test_api_version_display() {
    assert_eq!(format!("{}", ApiVersion::new(1, 3, 250)), "1.3");
}

// ============================================================================
// PLATFORM CONFIG TESTS
// ============================================================================

#[test]
fn test_platform_config_default() {
    let config = PlatformConfig::default();
    assert_eq!(config.build_mode, BuildMode::current());
    assert_eq!(config.min_api_version, ApiVersion::V1_1);
    assert!(config.required_extensions.is_empty());
    assert_eq!(config.required_queue, QueueCapability::Graphics);
    assert_eq!(config.debug_severity, DebugSeverity::ErrorsAndWarnings);
    assert!(config.create_device);
}

#[test]
fn test_platform_config_required_extensions_deduplicated() {
    let config = PlatformConfig::default()
        .with_required_extensions(["VK_KHR_surface", "VK_KHR_win32_surface"])
        .with_required_extensions(["VK_KHR_surface"]);

    assert_eq!(config.required_extensions.len(), 2);
    assert!(config.required_extensions.contains("VK_KHR_surface"));
}

#[test]
fn test_platform_config_builders() {
    let config = PlatformConfig::default()
        .with_app_name("Sample")
        .with_build_mode(BuildMode::Release)
        .with_min_api_version(ApiVersion::V1_2)
        .with_required_queue(QueueCapability::Compute)
        .with_debug_severity(DebugSeverity::All)
        .with_device_creation(false);

    assert_eq!(config.app_name, "Sample");
    assert_eq!(config.build_mode, BuildMode::Release);
    assert_eq!(config.min_api_version, ApiVersion::V1_2);
    assert_eq!(config.required_queue, QueueCapability::Compute);
    assert_eq!(config.debug_severity, DebugSeverity::All);
    assert!(!config.create_device);
}
