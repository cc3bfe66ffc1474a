//! # jsbridge Android
//!
//! JNI exports for `com.quickjs.android.QuickJSBridge`. The Java class is
//! expected to declare:
//!
//! ```java
//! private long nativeHandle;
//!
//! public native boolean initializeQuickJS();
//! public native boolean initializeQuickJSWithLimits(long memoryLimit, long gcThreshold);
//! public native String executeScript(String script);
//! public native byte[] compileScript(String script);
//! public native String executeBytecode(byte[] bytecode);
//! public native boolean resetContext();
//! public native boolean isInitialized();
//! public native void cleanupQuickJS();
//! public native String getMemoryUsage();
//! public native String nativeHttpRequest(String url, String options);
//!
//! // called from scripts' fetch / XMLHttpRequest
//! public String handleHttpRequest(String url, String options);
//! ```
//!
//! The session holds a global reference to the bridge object for its network
//! handler, so `cleanupQuickJS` must be called to release both.
//!
//! `handleHttpRequest` runs inside the `executeScript` / `executeBytecode`
//! call that triggered it. Exports it calls on the same bridge object from
//! that thread behave as if no session existed (`false`, `null`, or
//! `Error: QuickJS not initialized`), and `cleanupQuickJS` is ignored there.
//!
//! Nothing thrown inside a script crosses into Java: every script failure is
//! returned as text (see [`bridge`]). JNI-level errors are logged and mapped
//! to `false`, `null`, or an `Error: ...` string.

pub mod bridge;
mod handle;
pub mod host;
pub mod logging;

use jni::objects::{JByteArray, JObject, JString};
use jni::sys::{jboolean, jbyteArray, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use jsbridge_engine::{EngineLimits, EngineSession};
use std::ptr;

use crate::host::JniHostBridge;

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn new_jstring(env: &mut JNIEnv, text: &str) -> jstring {
    match env.new_string(text) {
        Ok(text) => text.into_raw(),
        Err(e) => {
            tracing::error!("Failed to create Java string: {}", e);
            ptr::null_mut()
        }
    }
}

fn read_jstring(env: &mut JNIEnv, text: &JString) -> Option<String> {
    if text.is_null() {
        return None;
    }
    match env.get_string(text) {
        Ok(text) => Some(text.into()),
        Err(e) => {
            tracing::error!("Failed to get script string: {}", e);
            None
        }
    }
}

fn initialize(env: &mut JNIEnv, this: &JObject, limits: EngineLimits) -> jboolean {
    logging::init();
    tracing::info!("JNI: Initializing QuickJS Engine with HTTP polyfills");

    let result = (|| -> jni::errors::Result<bool> {
        if !handle::is_installed(env, this)? {
            let host = JniHostBridge::new(env.get_java_vm()?, env.new_global_ref(this)?);
            handle::install(env, this, EngineSession::with_host(host))?;
        }

        handle::with_session(env, this, |session| match session {
            Some(session) => match session.initialize(limits) {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Failed to initialize QuickJS: {}", e);
                    false
                }
            },
            None => false,
        })
    })();

    match result {
        Ok(ready) => to_jboolean(ready),
        Err(e) => {
            tracing::error!("JNI error during initialization: {}", e);
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_initializeQuickJS<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jboolean {
    initialize(&mut env, &this, EngineLimits::default())
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_initializeQuickJSWithLimits<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    memory_limit: jlong,
    gc_threshold: jlong,
) -> jboolean {
    let (Ok(memory_limit), Ok(gc_threshold)) =
        (usize::try_from(memory_limit), usize::try_from(gc_threshold))
    else {
        logging::init();
        tracing::error!(
            "Invalid limits: memory_limit={}, gc_threshold={}",
            memory_limit,
            gc_threshold
        );
        return JNI_FALSE;
    };

    let limits = EngineLimits::new()
        .with_memory_limit(memory_limit)
        .with_gc_threshold(gc_threshold);
    initialize(&mut env, &this, limits)
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_executeScript<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    script: JString<'local>,
) -> jstring {
    let Some(source) = read_jstring(&mut env, &script) else {
        return new_jstring(&mut env, "Error: Failed to get script string");
    };

    let text = handle::with_session(&mut env, &this, |session| {
        bridge::execute_script(session.as_deref(), &source)
    })
    .unwrap_or_else(|e| format!("Error: {}", e));

    new_jstring(&mut env, &text)
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_compileScript<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    script: JString<'local>,
) -> jbyteArray {
    let Some(source) = read_jstring(&mut env, &script) else {
        return ptr::null_mut();
    };

    let bytes = match handle::with_session(&mut env, &this, |session| {
        bridge::compile_script(session.as_deref(), &source)
    }) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return ptr::null_mut(),
        Err(e) => {
            tracing::error!("JNI error during compilation: {}", e);
            return ptr::null_mut();
        }
    };

    match env.byte_array_from_slice(&bytes) {
        Ok(array) => array.into_raw(),
        Err(e) => {
            tracing::error!("Failed to create bytecode array: {}", e);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_executeBytecode<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    bytecode: JByteArray<'local>,
) -> jstring {
    let bytes = if bytecode.is_null() {
        None
    } else {
        match env.convert_byte_array(&bytecode) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!("Failed to get bytecode data: {}", e);
                return new_jstring(&mut env, "Error: Failed to get bytecode data");
            }
        }
    };

    let text = handle::with_session(&mut env, &this, |session| {
        bridge::execute_bytecode(session.as_deref(), bytes.as_deref())
    })
    .unwrap_or_else(|e| format!("Error: {}", e));

    new_jstring(&mut env, &text)
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_resetContext<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jboolean {
    let reset = handle::with_session(&mut env, &this, |session| match session {
        Some(session) => match session.reset() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to reset context: {}", e);
                false
            }
        },
        None => false,
    });

    match reset {
        Ok(reset) => to_jboolean(reset),
        Err(e) => {
            tracing::error!("JNI error during reset: {}", e);
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_isInitialized<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jboolean {
    let ready = handle::with_session(&mut env, &this, |session| {
        session.is_some_and(|session| session.is_ready())
    });
    to_jboolean(ready.unwrap_or(false))
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_cleanupQuickJS<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) {
    tracing::info!("JNI: Cleaning up QuickJS Engine");
    if let Err(e) = handle::release(&mut env, &this) {
        tracing::error!("JNI error during cleanup: {}", e);
    }
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_getMemoryUsage<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jstring {
    let text = handle::with_session(&mut env, &this, |session| {
        bridge::memory_usage_json(session.as_deref())
    })
    .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string());

    new_jstring(&mut env, &text)
}

#[no_mangle]
pub extern "system" fn Java_com_quickjs_android_QuickJSBridge_nativeHttpRequest<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    _url: JString<'local>,
    _options: JString<'local>,
) -> jstring {
    new_jstring(&mut env, bridge::EMPTY_RESPONSE)
}
