//! macOS keyboard tap (`CGEventTap`) and permission checks.
//!
//! Each tap runs on its own thread with a dedicated `CFRunLoop`. Removing a
//! tap stops that loop and joins the thread, so the callback and everything
//! it captured are dropped on the thread that ran them.

use crate::error::{InputError, Result};
use crate::event::{KeyEvent, Modifiers, Replacement};
use crate::handler::KeyDownHandler;
use crate::permissions::PermissionProbe;
use crate::tap::{TapBackend, TapPlacement, TapRegistration};
use core_foundation::base::TCFType;
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType, EventField,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use foreign_types::ForeignType;
use std::ffi::c_void;
use std::process::Command;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

/// How long `install` waits for the tap thread to report back.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on how long the tap thread runs before rechecking its flag.
const RUN_SLICE: Duration = Duration::from_millis(250);

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: *mut c_void, enable: bool);
    fn CGEventGetTimestamp(event: *mut c_void) -> u64;
    fn CGEventSetTimestamp(event: *mut c_void, timestamp: u64);
    fn CGPreflightListenEventAccess() -> bool;
    fn CGRequestListenEventAccess() -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFMachPortInvalidate(port: *mut c_void);
}

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

/// Borrowed view of a `CGEvent` delivered to the tap.
pub struct MacKeyEvent<'a>(pub &'a CGEvent);

impl KeyEvent for MacKeyEvent<'_> {
    type Output = CGEvent;

    fn key_code(&self) -> u16 {
        self.0
            .get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16
    }

    fn modifiers(&self) -> Modifiers {
        let flags = self.0.get_flags();
        Modifiers {
            shift: flags.contains(CGEventFlags::CGEventFlagShift),
            control: flags.contains(CGEventFlags::CGEventFlagControl),
            option: flags.contains(CGEventFlags::CGEventFlagAlternate),
            command: flags.contains(CGEventFlags::CGEventFlagCommand),
        }
    }

    fn timestamp(&self) -> u64 {
        unsafe { CGEventGetTimestamp(self.0.as_ptr() as *mut c_void) }
    }

    fn synthesize(&self, replacement: &Replacement) -> Result<CGEvent> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| InputError::EventSynthesis("event source unavailable".to_string()))?;
        let event = CGEvent::new_keyboard_event(source, replacement.key_code, true)
            .map_err(|_| InputError::EventSynthesis("keyboard event rejected".to_string()))?;

        event.set_string(replacement.text);
        event.set_flags(CGEventFlags::CGEventFlagNull);
        unsafe { CGEventSetTimestamp(event.as_ptr() as *mut c_void, replacement.timestamp) };
        Ok(event)
    }
}

/// Creates session-level, event-modifying key-down taps.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacTapBackend;

impl MacTapBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TapBackend for MacTapBackend {
    fn install(
        &self,
        placement: TapPlacement,
        handler: Arc<KeyDownHandler>,
    ) -> Result<Box<dyn TapRegistration>> {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = std::thread::Builder::new()
            .name("keyshift-tap".to_string())
            .spawn(move || run_tap(placement, handler, thread_running, tx))
            .map_err(|e| InputError::TapCreation(e.to_string()))?;

        match rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(run_loop)) => Ok(Box::new(MacTapRegistration {
                running,
                run_loop,
                thread: Some(thread),
            })),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(InputError::TapCreation(e))
            }
            Err(_) => {
                // The thread tears itself down once it sees the closed channel
                running.store(false, Ordering::SeqCst);
                Err(InputError::TapCreation(
                    "timed out waiting for event tap".to_string(),
                ))
            }
        }
    }
}

fn run_tap(
    placement: TapPlacement,
    handler: Arc<KeyDownHandler>,
    running: Arc<AtomicBool>,
    tx: mpsc::Sender<std::result::Result<TapRunLoop, String>>,
) {
    let port: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));
    let callback_port = Arc::clone(&port);

    let cg_placement = match placement {
        TapPlacement::Head => CGEventTapPlacement::HeadInsertEventTap,
        TapPlacement::Tail => CGEventTapPlacement::TailAppendEventTap,
    };

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        cg_placement,
        CGEventTapOptions::Default,
        vec![CGEventType::KeyDown],
        move |_proxy, event_type, event| match event_type {
            CGEventType::KeyDown => handler.handle_key_down(&MacKeyEvent(event)),
            CGEventType::TapDisabledByTimeout => {
                let raw = callback_port.load(Ordering::SeqCst);
                if !raw.is_null() {
                    unsafe { CGEventTapEnable(raw, true) };
                }
                None
            }
            _ => None,
        },
    );

    let tap = match tap {
        Ok(tap) => tap,
        Err(()) => {
            let _ = tx.send(Err(format!("CGEventTapCreate failed at {placement:?}")));
            return;
        }
    };
    let raw_port = tap.mach_port.as_concrete_TypeRef() as *mut c_void;
    port.store(raw_port, Ordering::SeqCst);

    let source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            unsafe { CFMachPortInvalidate(raw_port) };
            let _ = tx.send(Err("failed to create run loop source".to_string()));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    unsafe { run_loop.add_source(&source, kCFRunLoopCommonModes) };
    tap.enable();

    if tx.send(Ok(TapRunLoop(run_loop.clone()))).is_ok() {
        while running.load(Ordering::SeqCst) {
            let _ = CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, RUN_SLICE, false);
        }
    }

    unsafe { CGEventTapEnable(raw_port, false) };
    port.store(std::ptr::null_mut(), Ordering::SeqCst);
    unsafe { run_loop.remove_source(&source, kCFRunLoopCommonModes) };
    unsafe { CFMachPortInvalidate(raw_port) };
    drop(tap);
    tracing::debug!(?placement, "Tap thread exiting");
}

/// The tap thread's run loop, handed back to the installer.
struct TapRunLoop(CFRunLoop);

// SAFETY: only used to call CFRunLoopStop, which CoreFoundation documents as
// callable from any thread.
unsafe impl Send for TapRunLoop {}

struct MacTapRegistration {
    running: Arc<AtomicBool>,
    run_loop: TapRunLoop,
    thread: Option<JoinHandle<()>>,
}

impl TapRegistration for MacTapRegistration {
    fn remove(mut self: Box<Self>) {
        self.running.store(false, Ordering::SeqCst);
        self.run_loop.0.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Tap thread panicked during shutdown");
            }
        }
    }
}

/// Permission checks backed by CoreGraphics and Accessibility.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacPermissionProbe;

impl PermissionProbe for MacPermissionProbe {
    fn check_input_monitoring(&self, prompt: bool) -> bool {
        if unsafe { CGPreflightListenEventAccess() } {
            return true;
        }
        if prompt {
            tracing::warn!("Input Monitoring permission not granted. Requesting access...");
            return unsafe { CGRequestListenEventAccess() };
        }
        false
    }

    fn check_accessibility(&self, prompt: bool) -> bool {
        if unsafe { AXIsProcessTrusted() } {
            return true;
        }
        if prompt {
            tracing::warn!("Accessibility permission not granted. Opening System Settings...");
            let _ = Command::new("open")
                .arg("x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility")
                .spawn();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_probe() {
        // Result depends on system permissions; must not panic
        let probe = MacPermissionProbe;
        println!("Input monitoring: {}", probe.check_input_monitoring(false));
        println!("Accessibility: {}", probe.check_accessibility(false));
    }
}
