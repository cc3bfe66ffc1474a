//! Network handler that calls back into the Java bridge object.

use jni::objects::{GlobalRef, JString, JValue};
use jni::{JNIEnv, JavaVM};
use jsbridge_common::{BridgeError, Result};
use jsbridge_engine::HostBridge;

const HANDLER_NAME: &str = "handleHttpRequest";
const HANDLER_SIGNATURE: &str = "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;";

/// [`HostBridge`] invoking `String handleHttpRequest(String url, String options)`
/// on the `QuickJSBridge` instance that initialized the session.
///
/// The handler runs while the calling export holds the session. Exports it
/// calls on the same bridge object from the same thread see no session; see
/// the crate docs.
pub struct JniHostBridge {
    vm: JavaVM,
    bridge: GlobalRef,
}

impl JniHostBridge {
    pub fn new(vm: JavaVM, bridge: GlobalRef) -> Self {
        Self { vm, bridge }
    }

    fn call_handler(&self, url: &str, options_json: &str) -> jni::errors::Result<Option<String>> {
        let mut env = self.vm.attach_current_thread()?;

        let url = env.new_string(url)?;
        let options = match env.new_string(options_json) {
            Ok(options) => options,
            Err(e) => {
                let _ = env.delete_local_ref(url);
                return Err(e);
            }
        };

        let result = self.invoke(&mut env, &url, &options);
        let _ = env.delete_local_ref(url);
        let _ = env.delete_local_ref(options);
        result
    }

    fn invoke(
        &self,
        env: &mut JNIEnv,
        url: &JString,
        options: &JString,
    ) -> jni::errors::Result<Option<String>> {
        let result = env
            .call_method(
                self.bridge.as_obj(),
                HANDLER_NAME,
                HANDLER_SIGNATURE,
                &[JValue::Object(url), JValue::Object(options)],
            )?
            .l()?;

        if result.is_null() {
            return Ok(None);
        }

        let result = JString::from(result);
        let text = env.get_string(&result).map(String::from);
        let _ = env.delete_local_ref(result);
        text.map(Some)
    }
}

impl HostBridge for JniHostBridge {
    fn handle_http_request(&self, url: &str, options_json: &str) -> Result<String> {
        match self.call_handler(url, options_json) {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(BridgeError::HostBridge(format!(
                "{} returned null for {}",
                HANDLER_NAME, url
            ))),
            Err(e) => {
                clear_pending_exception(&self.vm);
                Err(BridgeError::HostBridge(format!(
                    "{} failed for {}: {}",
                    HANDLER_NAME, url, e
                )))
            }
        }
    }
}

fn clear_pending_exception(vm: &JavaVM) {
    let Ok(env) = vm.attach_current_thread() else {
        return;
    };
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}
