//! Session ownership through the Java object's `long nativeHandle` field.
//!
//! The field holds a pointer to a boxed `Mutex<EngineSession>`, or 0 when no
//! session exists. Calls from different Java threads serialize on the mutex.
//! `cleanupQuickJS` frees the box, so it must not race with other calls on
//! the same bridge object.
//!
//! # Re-entry
//!
//! A script's `fetch` calls back into Java (`handleHttpRequest`) while the
//! session lock is held. If that handler calls an export on the same bridge
//! object from the same thread, the call sees no session (`isInitialized()`
//! is `false`, `executeScript` answers "Error: QuickJS not initialized") and
//! `cleanupQuickJS` does nothing. Other bridge objects are unaffected.

use jni::objects::{JObject, JValue};
use jni::sys::jlong;
use jni::JNIEnv;
use jsbridge_engine::EngineSession;
use std::cell::RefCell;
use std::sync::{Mutex, PoisonError};

const HANDLE_FIELD: &str = "nativeHandle";
const HANDLE_TYPE: &str = "J";

type SharedSession = Mutex<EngineSession>;

thread_local! {
    /// Handles whose session is in use further up this thread's stack.
    static ACTIVE: RefCell<Vec<jlong>> = const { RefCell::new(Vec::new()) };
}

/// Marks a handle as in use on the current thread until dropped.
pub(crate) struct Entered {
    handle: jlong,
}

impl Entered {
    /// Returns `None` if `handle` is already in use on this thread.
    pub(crate) fn enter(handle: jlong) -> Option<Self> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&handle) {
                return None;
            }
            active.push(handle);
            Some(Self { handle })
        })
    }
}

impl Drop for Entered {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(position) = active.iter().rposition(|handle| *handle == self.handle) {
                active.remove(position);
            }
        });
    }
}

fn read(env: &mut JNIEnv, this: &JObject) -> jni::errors::Result<jlong> {
    env.get_field(this, HANDLE_FIELD, HANDLE_TYPE)?.j()
}

fn write(env: &mut JNIEnv, this: &JObject, handle: jlong) -> jni::errors::Result<()> {
    env.set_field(this, HANDLE_FIELD, HANDLE_TYPE, JValue::Long(handle))
}

/// Whether the object currently owns a session.
pub(crate) fn is_installed(env: &mut JNIEnv, this: &JObject) -> jni::errors::Result<bool> {
    Ok(read(env, this)? != 0)
}

/// Moves `session` behind the object's handle.
pub(crate) fn install(env: &mut JNIEnv, this: &JObject, session: EngineSession) -> jni::errors::Result<()> {
    let shared = Box::into_raw(Box::new(Mutex::new(session)));
    if let Err(e) = write(env, this, shared as jlong) {
        // SAFETY: `shared` was created above and never published.
        drop(unsafe { Box::from_raw(shared) });
        return Err(e);
    }
    Ok(())
}

/// Runs `f` with the object's session, or with `None` if it has none or the
/// session is already in use on this thread.
pub(crate) fn with_session<R>(
    env: &mut JNIEnv,
    this: &JObject,
    f: impl FnOnce(Option<&mut EngineSession>) -> R,
) -> jni::errors::Result<R> {
    let handle = read(env, this)?;
    if handle == 0 {
        return Ok(f(None));
    }

    let Some(_entered) = Entered::enter(handle) else {
        tracing::error!("QuickJS session called from its own host callback");
        return Ok(f(None));
    };

    // SAFETY: a non-zero handle is always a pointer written by `install` and
    // not yet freed by `release`.
    let shared = unsafe { &*(handle as *const SharedSession) };
    let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(f(Some(&mut session)))
}

/// Clears the handle and drops the session, tearing it down.
///
/// Does nothing when called from inside a call on the same session.
pub(crate) fn release(env: &mut JNIEnv, this: &JObject) -> jni::errors::Result<()> {
    let handle = read(env, this)?;
    if handle == 0 {
        return Ok(());
    }

    let Some(_entered) = Entered::enter(handle) else {
        tracing::error!("Cannot clean up QuickJS from its own host callback");
        return Ok(());
    };

    write(env, this, 0)?;
    // SAFETY: the handle came from `install` and has just been unpublished.
    let shared = unsafe { Box::from_raw(handle as *mut SharedSession) };
    drop(shared);
    Ok(())
}
