//! macOS implementation of the context tracker.

use crate::browser::is_browser;
use crate::provider::ContextTracker;
use crate::state::{AppInfo, AppKind, WebsiteContext};
use std::sync::RwLock;

// Native Cocoa imports for efficient frontmost app detection
use objc::runtime::{Class, Object};
use objc::{msg_send, sel, sel_impl};

/// macOS implementation using native Cocoa APIs.
///
/// Uses NSWorkspace.frontmostApplication and NSWorkspace.runningApplications
/// without subprocess overhead. Website identity is not detected here; a
/// browser detector pushes it in with [`MacOSProvider::set_website`].
#[derive(Debug, Default)]
pub struct MacOSProvider {
    /// Last website reported for the focused browser
    website: RwLock<Option<(String, WebsiteContext)>>,
}

impl MacOSProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the website focused in `browser_bundle_id`.
    ///
    /// Only applied while that browser is frontmost. Pass `None` to clear.
    pub fn set_website(&self, browser_bundle_id: &str, website: Option<WebsiteContext>) {
        if let Ok(mut guard) = self.website.write() {
            *guard = website.map(|w| (browser_bundle_id.to_string(), w));
        }
    }

    fn website_for(&self, bundle_id: &str) -> Option<WebsiteContext> {
        if !is_browser(bundle_id) {
            return None;
        }
        let guard = self.website.read().ok()?;
        match guard.as_ref() {
            Some((owner, website)) if owner == bundle_id => Some(website.clone()),
            _ => None,
        }
    }
}

impl ContextTracker for MacOSProvider {
    fn current(&self) -> Option<AppKind> {
        let app = get_frontmost_app()?;
        Some(match self.website_for(&app.bundle_id) {
            Some(website) => AppKind::website(app, website),
            None => AppKind::app(app),
        })
    }

    fn running_bundle_ids(&self) -> Vec<String> {
        get_running_bundle_ids()
    }
}

pub(super) fn shared_workspace() -> Option<*mut Object> {
    unsafe {
        let workspace_class = Class::get("NSWorkspace")?;
        let shared_workspace: *mut Object = msg_send![workspace_class, sharedWorkspace];
        if shared_workspace.is_null() {
            None
        } else {
            Some(shared_workspace)
        }
    }
}

/// Get the frontmost application using native Cocoa APIs.
fn get_frontmost_app() -> Option<AppInfo> {
    unsafe {
        let workspace = shared_workspace()?;

        let frontmost_app: *mut Object = msg_send![workspace, frontmostApplication];
        if frontmost_app.is_null() {
            return None;
        }

        app_info(frontmost_app)
    }
}

/// Bundle IDs of every running application with one.
fn get_running_bundle_ids() -> Vec<String> {
    let Some(workspace) = shared_workspace() else {
        return Vec::new();
    };

    unsafe {
        let apps: *mut Object = msg_send![workspace, runningApplications];
        if apps.is_null() {
            return Vec::new();
        }

        let count: usize = msg_send![apps, count];
        let mut ids = Vec::with_capacity(count);
        for index in 0..count {
            let app: *mut Object = msg_send![apps, objectAtIndex: index];
            let bundle_id_ns: *mut Object = msg_send![app, bundleIdentifier];
            if let Some(bundle_id) = nsstring_to_string(bundle_id_ns) {
                if !bundle_id.is_empty() {
                    ids.push(bundle_id);
                }
            }
        }
        ids
    }
}

/// Read bundle ID and localized name from an NSRunningApplication.
unsafe fn app_info(app: *mut Object) -> Option<AppInfo> {
    let bundle_id_ns: *mut Object = msg_send![app, bundleIdentifier];
    let bundle_id = nsstring_to_string(bundle_id_ns)?;

    if bundle_id.is_empty() {
        return None;
    }

    let name_ns: *mut Object = msg_send![app, localizedName];
    let name = nsstring_to_string(name_ns);

    Some(AppInfo { bundle_id, name })
}

/// Convert NSString to Rust String.
pub(super) unsafe fn nsstring_to_string(nsstring: *mut Object) -> Option<String> {
    if nsstring.is_null() {
        return None;
    }

    let c_str: *const std::os::raw::c_char = msg_send![nsstring, UTF8String];
    if c_str.is_null() {
        return None;
    }

    let rust_str = std::ffi::CStr::from_ptr(c_str).to_str().ok()?;
    Some(rust_str.to_string())
}
