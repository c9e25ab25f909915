//! Platform-specific tap backends and permission probes.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{MacKeyEvent, MacPermissionProbe, MacTapBackend};

#[cfg(target_os = "macos")]
pub type PlatformTapBackend = MacTapBackend;
#[cfg(target_os = "macos")]
pub type PlatformPermissionProbe = MacPermissionProbe;

#[cfg(not(target_os = "macos"))]
pub type PlatformTapBackend = UnsupportedTapBackend;
#[cfg(not(target_os = "macos"))]
pub type PlatformPermissionProbe = crate::permissions::GrantedProbe;

/// Backend for platforms without a keyboard tap.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedTapBackend;

impl crate::tap::TapBackend for UnsupportedTapBackend {
    fn install(
        &self,
        _placement: crate::tap::TapPlacement,
        _handler: std::sync::Arc<crate::handler::KeyDownHandler>,
    ) -> crate::error::Result<Box<dyn crate::tap::TapRegistration>> {
        Err(crate::error::InputError::Unsupported)
    }
}
