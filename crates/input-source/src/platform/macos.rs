//! macOS Text Input Sources (TIS) backend.
//!
//! TIS lives in the Carbon HIToolbox framework and asserts it is called on
//! the main queue. [`MacInputSourceTracker`] must only be used from the main
//! thread; [`RunLoopPump`] drives it there and other threads read the
//! mirrored [`SharedInputSources`](crate::SharedInputSources).

use crate::error::{InputSourceError, Result};
use crate::shared::InputSourcePump;
use crate::source::InputSource;
use crate::tracker::InputSourceTracker;
use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFType, CFTypeRef, TCFType};
use core_foundation::boolean::{CFBoolean, CFBooleanRef};
use core_foundation::date::CFAbsoluteTimeGetCurrent;
use core_foundation::dictionary::CFDictionaryRef;
use core_foundation::runloop::{
    kCFRunLoopCommonModes, CFRunLoop, CFRunLoopTimer, CFRunLoopTimerContext, CFRunLoopTimerRef,
};
use core_foundation::string::{CFString, CFStringRef};
use std::ffi::c_void;
use std::time::Duration;

type TISInputSourceRef = *const c_void;
type OSStatus = i32;

#[link(name = "Carbon", kind = "framework")]
extern "C" {
    fn TISCopyCurrentKeyboardInputSource() -> TISInputSourceRef;
    fn TISCreateInputSourceList(properties: CFDictionaryRef, include_all_installed: u8)
        -> CFArrayRef;
    fn TISGetInputSourceProperty(source: TISInputSourceRef, key: CFStringRef) -> *const c_void;
    fn TISSelectInputSource(source: TISInputSourceRef) -> OSStatus;

    static kTISPropertyInputSourceID: CFStringRef;
    static kTISPropertyLocalizedName: CFStringRef;
    static kTISPropertyInputSourceLanguages: CFStringRef;
    static kTISPropertyInputSourceCategory: CFStringRef;
    static kTISPropertyInputSourceIsSelectCapable: CFStringRef;
    static kTISCategoryKeyboardInputSource: CFStringRef;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRunLoopTimerInvalidate(timer: CFRunLoopTimerRef);
}

/// Input source tracker backed by the system TIS API. Main thread only.
#[derive(Debug, Default)]
pub struct MacInputSourceTracker;

impl MacInputSourceTracker {
    pub fn new() -> Self {
        Self
    }
}

impl InputSourceTracker for MacInputSourceTracker {
    fn current(&self) -> Result<InputSource> {
        unsafe {
            let raw = TISCopyCurrentKeyboardInputSource();
            if raw.is_null() {
                return Err(InputSourceError::Unavailable);
            }
            // Copy rule: released when `owned` drops
            let owned = CFType::wrap_under_create_rule(raw as CFTypeRef);
            to_input_source(owned.as_CFTypeRef()).ok_or(InputSourceError::Unavailable)
        }
    }

    fn select(&self, source: &InputSource) -> Result<()> {
        let list = keyboard_sources();
        let Some(target) = list.iter().find(|item| {
            let id = unsafe { string_property(item.as_CFTypeRef(), kTISPropertyInputSourceID) };
            id.as_deref() == Some(source.id.as_str())
        }) else {
            return Err(InputSourceError::NotInstalled(source.id.clone()));
        };

        let status = unsafe { TISSelectInputSource(target.as_CFTypeRef()) };
        if status != 0 {
            return Err(InputSourceError::SelectFailed {
                id: source.id.clone(),
                status,
            });
        }

        tracing::debug!(source = %source.id, "selected input source");
        Ok(())
    }

    fn list(&self) -> Vec<InputSource> {
        keyboard_sources()
            .iter()
            .filter_map(|item| unsafe { to_input_source(item.as_CFTypeRef()) })
            .collect()
    }
}

/// Ticks an [`InputSourcePump`] from a timer on the current run loop.
///
/// Schedule it from the main thread and keep that run loop running. Dropping
/// it removes the timer and the pump.
pub struct RunLoopPump {
    timer: CFRunLoopTimer,
    pump: *mut InputSourcePump<MacInputSourceTracker>,
}

impl RunLoopPump {
    pub fn schedule(pump: InputSourcePump<MacInputSourceTracker>, interval: Duration) -> Self {
        // Populate the shared view before anyone reads it
        pump.tick();

        let pump = Box::into_raw(Box::new(pump));
        let seconds = interval.as_secs_f64();
        let timer = CFRunLoopTimer::new(
            unsafe { CFAbsoluteTimeGetCurrent() } + seconds,
            seconds,
            0,
            0,
            tick_pump,
            &mut CFRunLoopTimerContext {
                version: 0,
                info: pump as *mut c_void,
                retain: None,
                release: None,
                copyDescription: None,
            },
        );
        unsafe { CFRunLoop::get_current().add_timer(&timer, kCFRunLoopCommonModes) };
        tracing::debug!(?interval, "input source pump scheduled");

        Self { timer, pump }
    }
}

extern "C" fn tick_pump(_timer: CFRunLoopTimerRef, info: *mut c_void) {
    // SAFETY: `info` is the boxed pump owned by the `RunLoopPump`, which
    // invalidates this timer before freeing it.
    let pump = unsafe { &*(info as *const InputSourcePump<MacInputSourceTracker>) };
    pump.tick();
}

impl Drop for RunLoopPump {
    fn drop(&mut self) {
        unsafe {
            CFRunLoopTimerInvalidate(self.timer.as_concrete_TypeRef());
            drop(Box::from_raw(self.pump));
        }
    }
}

/// Enabled, selectable keyboard input sources.
fn keyboard_sources() -> Vec<CFType> {
    unsafe {
        let raw = TISCreateInputSourceList(std::ptr::null(), 0);
        if raw.is_null() {
            return Vec::new();
        }
        let array: CFArray<CFType> = CFArray::wrap_under_create_rule(raw);

        array
            .iter()
            .filter(|item| {
                let source = item.as_CFTypeRef();
                let category = string_property(source, kTISPropertyInputSourceCategory);
                let keyboard = CFString::wrap_under_get_rule(kTISCategoryKeyboardInputSource);
                category.as_deref() == Some(keyboard.to_string().as_str())
                    && bool_property(source, kTISPropertyInputSourceIsSelectCapable)
            })
            .map(|item| (*item).clone())
            .collect()
    }
}

unsafe fn to_input_source(source: CFTypeRef) -> Option<InputSource> {
    let id = string_property(source, kTISPropertyInputSourceID)?;
    let name = string_property(source, kTISPropertyLocalizedName).unwrap_or_else(|| id.clone());
    let languages = languages_property(source);
    Some(InputSource::from_languages(id, name, &languages))
}

unsafe fn string_property(source: CFTypeRef, key: CFStringRef) -> Option<String> {
    let value = TISGetInputSourceProperty(source as TISInputSourceRef, key);
    if value.is_null() {
        return None;
    }
    // Get rule: TIS owns the property value
    Some(CFString::wrap_under_get_rule(value as CFStringRef).to_string())
}

unsafe fn bool_property(source: CFTypeRef, key: CFStringRef) -> bool {
    let value = TISGetInputSourceProperty(source as TISInputSourceRef, key);
    if value.is_null() {
        return false;
    }
    CFBoolean::wrap_under_get_rule(value as CFBooleanRef).into()
}

unsafe fn languages_property(source: CFTypeRef) -> Vec<String> {
    let value = TISGetInputSourceProperty(source as TISInputSourceRef, kTISPropertyInputSourceLanguages);
    if value.is_null() {
        return Vec::new();
    }
    let array: CFArray<CFType> = CFArray::wrap_under_get_rule(value as CFArrayRef);
    array
        .iter()
        .filter_map(|item| item.downcast::<CFString>())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "TIS aborts off the main queue; run with --ignored --test-threads=1 from a GUI session"]
    fn test_current_input_source() {
        // Smoke test; depends on the machine's configured input sources
        let tracker = MacInputSourceTracker::new();
        println!("Current input source: {:?}", tracker.current());
        println!("Installed: {}", tracker.list().len());
    }
}
