//! Observers for the workspace and distributed notification centers.

use super::macos::{nsstring_to_string, shared_workspace};
use crate::notifications::{
    NotificationCallback, SystemNotification, INPUT_SOURCES_CHANGED, SCREENS_DID_WAKE,
    SCREEN_UNLOCKED, SESSION_DID_BECOME_ACTIVE,
};
use core_foundation::base::TCFType;
use core_foundation::dictionary::CFDictionaryRef;
use core_foundation::string::{CFString, CFStringRef};
use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{class, msg_send, sel, sel_impl};
use std::ffi::{c_void, CString};

type CFNotificationCenterRef = *mut c_void;
type CFNotificationCallback = extern "C" fn(
    center: CFNotificationCenterRef,
    observer: *mut c_void,
    name: CFStringRef,
    object: *const c_void,
    user_info: CFDictionaryRef,
);

/// CFNotificationSuspensionBehaviorDeliverImmediately
const DELIVER_IMMEDIATELY: isize = 4;

const OBSERVER_CLASS: &str = "KeyshiftNotificationObserver";
const SINK_IVAR: &str = "keyshiftSink";

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFNotificationCenterGetDistributedCenter() -> CFNotificationCenterRef;
    fn CFNotificationCenterAddObserver(
        center: CFNotificationCenterRef,
        observer: *const c_void,
        callback: CFNotificationCallback,
        name: CFStringRef,
        object: *const c_void,
        suspension_behavior: isize,
    );
    fn CFNotificationCenterRemoveEveryObserver(
        center: CFNotificationCenterRef,
        observer: *const c_void,
    );
}

/// Subscription to screen unlock, session and input source notifications.
///
/// Register on the main thread and keep its run loop running; both
/// centers deliver there. Dropping the observer unsubscribes.
pub struct SystemObserver {
    sink: *mut NotificationCallback,
    workspace_observer: *mut Object,
}

impl SystemObserver {
    pub fn register(callback: NotificationCallback) -> Self {
        let sink = Box::into_raw(Box::new(callback));

        unsafe {
            let center = CFNotificationCenterGetDistributedCenter();
            for name in [SCREEN_UNLOCKED, INPUT_SOURCES_CHANGED] {
                let name = CFString::new(name);
                CFNotificationCenterAddObserver(
                    center,
                    sink as *const c_void,
                    on_distributed,
                    name.as_concrete_TypeRef(),
                    std::ptr::null(),
                    DELIVER_IMMEDIATELY,
                );
            }
        }

        let workspace_observer = unsafe { add_workspace_observer(sink) };
        if workspace_observer.is_null() {
            tracing::warn!("NSWorkspace notifications unavailable");
        }
        tracing::debug!("System notification observers registered");

        Self {
            sink,
            workspace_observer,
        }
    }
}

impl Drop for SystemObserver {
    fn drop(&mut self) {
        unsafe {
            CFNotificationCenterRemoveEveryObserver(
                CFNotificationCenterGetDistributedCenter(),
                self.sink as *const c_void,
            );

            if !self.workspace_observer.is_null() {
                if let Some(workspace) = shared_workspace() {
                    let center: *mut Object = msg_send![workspace, notificationCenter];
                    let _: () = msg_send![center, removeObserver: self.workspace_observer];
                }
                let _: () = msg_send![self.workspace_observer, release];
            }

            // Both centers have let go of the pointer above
            drop(Box::from_raw(self.sink));
        }
    }
}

extern "C" fn on_distributed(
    _center: CFNotificationCenterRef,
    observer: *mut c_void,
    name: CFStringRef,
    _object: *const c_void,
    _user_info: CFDictionaryRef,
) {
    if observer.is_null() || name.is_null() {
        return;
    }
    let name = unsafe { CFString::wrap_under_get_rule(name) }.to_string();
    if let Some(notification) = SystemNotification::from_name(&name) {
        // SAFETY: `observer` is the sink owned by a live `SystemObserver`
        let sink = unsafe { &*(observer as *const NotificationCallback) };
        sink(notification);
    }
}

extern "C" fn on_workspace(this: &Object, _cmd: Sel, notification: *mut Object) {
    unsafe {
        let sink = *this.get_ivar::<usize>(SINK_IVAR) as *const NotificationCallback;
        if sink.is_null() || notification.is_null() {
            return;
        }
        let name: *mut Object = msg_send![notification, name];
        if let Some(notification) = nsstring_to_string(name)
            .as_deref()
            .and_then(SystemNotification::from_name)
        {
            (*sink)(notification);
        }
    }
}

fn observer_class() -> Option<&'static Class> {
    if let Some(class) = Class::get(OBSERVER_CLASS) {
        return Some(class);
    }

    let mut decl = ClassDecl::new(OBSERVER_CLASS, class!(NSObject))?;
    decl.add_ivar::<usize>(SINK_IVAR);
    unsafe {
        decl.add_method(
            sel!(systemNotification:),
            on_workspace as extern "C" fn(&Object, Sel, *mut Object),
        );
    }
    Some(decl.register())
}

unsafe fn add_workspace_observer(sink: *mut NotificationCallback) -> *mut Object {
    let (Some(class), Some(workspace)) = (observer_class(), shared_workspace()) else {
        return std::ptr::null_mut();
    };

    let observer: *mut Object = msg_send![class, new];
    if observer.is_null() {
        return observer;
    }
    (*observer).set_ivar::<usize>(SINK_IVAR, sink as usize);

    let center: *mut Object = msg_send![workspace, notificationCenter];
    for name in [SCREENS_DID_WAKE, SESSION_DID_BECOME_ACTIVE] {
        let Some(name) = nsstring(name) else {
            continue;
        };
        let _: () = msg_send![center,
            addObserver: observer
            selector: sel!(systemNotification:)
            name: name
            object: std::ptr::null_mut::<Object>()];
    }
    observer
}

unsafe fn nsstring(text: &str) -> Option<*mut Object> {
    let text = CString::new(text).ok()?;
    let string: *mut Object = msg_send![class!(NSString), stringWithUTF8String: text.as_ptr()];
    (!string.is_null()).then_some(string)
}
