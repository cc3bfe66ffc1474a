#[cfg(test)]
mod tests {
    use crate::runtime::codec::seal;
    use crate::session::{EngineSession, SessionState};
    use crate::{BridgeError, EngineLimits, FailureKind};
    use jsbridge_common::{HttpRequestOptions, HttpResponse};
    use std::sync::{Arc, Mutex};

    fn ready_session() -> EngineSession {
        let mut session = EngineSession::new(None);
        session.initialize(EngineLimits::default()).unwrap();
        session
    }

    fn eval_value(session: &EngineSession, source: &str) -> String {
        session
            .evaluate(source)
            .into_result()
            .unwrap_or_else(|f| panic!("{} failed: {}", source, f))
    }

    fn eval_value_bytecode(session: &EngineSession, bytes: &[u8]) -> String {
        session
            .evaluate_bytecode(bytes)
            .into_result()
            .unwrap_or_else(|f| panic!("bytecode failed: {}", f))
    }

    /// Host bridge that records every request and answers with a fixed document.
    struct RecordingHost {
        requests: Mutex<Vec<(String, String)>>,
        response: String,
    }

    impl RecordingHost {
        fn answering(response: String) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response,
            })
        }
    }

    impl crate::HostBridge for RecordingHost {
        fn handle_http_request(&self, url: &str, options_json: &str) -> jsbridge_common::Result<String> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), options_json.to_string()));
            Ok(self.response.clone())
        }
    }

    fn session_with(host: Arc<dyn crate::HostBridge>) -> EngineSession {
        let mut session = EngineSession::new(Some(host));
        session.initialize(EngineLimits::default()).unwrap();
        session
    }

    // ========================================================================
    // Values
    // ========================================================================

    #[test]
    fn test_arithmetic() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "1+2"), "3");
    }

    #[test]
    fn test_string_result() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "'hello' + ' ' + 'world'"), "hello world");
    }

    #[test]
    fn test_object_and_array_results() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "({a: 1})"), "[object Object]");
        assert_eq!(eval_value(&session, "[1, 2, 3]"), "1,2,3");
        assert_eq!(eval_value(&session, "JSON.stringify({a: 1})"), r#"{"a":1}"#);
    }

    #[test]
    fn test_undefined_and_null_results() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "undefined"), "undefined");
        assert_eq!(eval_value(&session, "var unused = 1;"), "undefined");
        assert_eq!(eval_value(&session, "null"), "null");
    }

    #[test]
    fn test_sloppy_mode_global_assignment() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "implicitGlobal = 5; implicitGlobal * 2"), "10");
    }

    #[test]
    fn test_globals_persist_between_evaluations() {
        let session = ready_session();
        eval_value(&session, "var counter = 1;");
        eval_value(&session, "counter += 41;");
        assert_eq!(eval_value(&session, "counter"), "42");
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_thrown_error_is_runtime_error() {
        let session = ready_session();
        let outcome = session.evaluate("throw new Error('boom')");
        let failure = outcome.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert!(failure.message.contains("boom"));
        assert_eq!(outcome.to_host_string(), "JavaScript Error: Error: boom");
    }

    #[test]
    fn test_thrown_primitive() {
        let session = ready_session();
        let failure = session.evaluate("throw 'oops'").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert_eq!(failure.message, "oops");
    }

    #[test]
    fn test_reference_error() {
        let session = ready_session();
        let failure = session.evaluate("notDefinedAnywhere + 1").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert!(failure.message.starts_with("ReferenceError"));
        assert!(failure.message.contains("notDefinedAnywhere"));
    }

    #[test]
    fn test_syntax_error() {
        let session = ready_session();
        let failure = session.evaluate("function (").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::SyntaxError);
        assert!(failure.message.starts_with("SyntaxError"));
    }

    #[test]
    fn test_syntax_error_thrown_while_running_is_runtime_error() {
        let session = ready_session();
        let failure = session.evaluate("JSON.parse('{')").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert!(failure.message.starts_with("SyntaxError"));

        let failure = session.evaluate("eval('function (')").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert!(failure.message.starts_with("SyntaxError"));
    }

    #[test]
    fn test_syntax_error_does_not_run_earlier_statements() {
        let session = ready_session();
        let failure = session.evaluate("var partial = 1; function (").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::SyntaxError);
        assert_eq!(eval_value(&session, "typeof partial"), "undefined");
    }

    #[test]
    fn test_description_falls_back_to_name_and_message() {
        let session = ready_session();
        let failure = session
            .evaluate("throw { name: 'Custom', message: 'bad', toString() { throw 1; } }")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.message, "Custom: bad");
    }

    #[test]
    fn test_description_unknown_error() {
        let session = ready_session();
        let failure = session
            .evaluate("throw { toString() { return ''; } }")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.message, "Unknown error");
    }

    #[test]
    fn test_failure_leaves_session_usable() {
        let session = ready_session();
        assert!(!session.evaluate("throw new TypeError('x')").is_success());
        assert_eq!(eval_value(&session, "2 * 21"), "42");
    }

    // ========================================================================
    // Promises
    // ========================================================================

    #[test]
    fn test_resolved_promise() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "Promise.resolve(42)"), "42");
    }

    #[test]
    fn test_rejected_promise() {
        let session = ready_session();
        let outcome = session.evaluate("Promise.reject(new Error('nope'))");
        let failure = outcome.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "Error: nope");
        assert_eq!(outcome.to_host_string(), "Promise Rejection: Error: nope");
    }

    #[test]
    fn test_async_function_result() {
        let session = ready_session();
        let source = "(async () => { const a = await Promise.resolve(20); await null; return a + 22; })()";
        assert_eq!(eval_value(&session, source), "42");
    }

    #[test]
    fn test_async_function_throwing() {
        let session = ready_session();
        let failure = session
            .evaluate("(async () => { await null; throw new RangeError('late'); })()")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "RangeError: late");
    }

    #[test]
    fn test_never_settling_promise() {
        let session = ready_session();
        let failure = session.evaluate("new Promise(() => {})").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "Promise did not settle");
    }

    #[test]
    fn test_promise_settled_by_timer() {
        let session = ready_session();
        let source = "new Promise(resolve => setTimeout(() => resolve('later'), 1000))";
        assert_eq!(eval_value(&session, source), "later");
    }

    // ========================================================================
    // Polyfills
    // ========================================================================

    #[test]
    fn test_timers_run_synchronously_in_call_order() {
        let session = ready_session();
        let source = r#"
            var order = [];
            setTimeout(() => order.push('slow'), 500);
            setTimeout(() => order.push('fast'), 0);
            setInterval(() => order.push('interval'), 10);
            order.push('after');
            order.join(',')
        "#;
        assert_eq!(eval_value(&session, source), "slow,fast,interval,after");
    }

    #[test]
    fn test_timer_ids_and_clear() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "setTimeout(() => {}, 0)"), "1");
        assert_eq!(eval_value(&session, "clearTimeout(1)"), "undefined");
        assert_eq!(eval_value(&session, "clearInterval(setInterval(() => {}, 5))"), "undefined");
    }

    #[test]
    fn test_timer_callback_exception_propagates() {
        let session = ready_session();
        let failure = session
            .evaluate("setTimeout(() => { throw new Error('in timer'); }, 0)")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert_eq!(failure.message, "Error: in timer");
    }

    #[test]
    fn test_console_returns_formatted_message() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "console.log('a', 1, true)"), "a 1 true");
        assert_eq!(eval_value(&session, "console.error('bad')"), "ERROR: bad");
        assert_eq!(eval_value(&session, "console.warn('careful')"), "WARN: careful");
        assert_eq!(eval_value(&session, "console.info('note')"), "INFO: note");
    }

    #[test]
    fn test_console_formats_objects_as_json() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "console.log({a: 1})"), "{\n  \"a\": 1\n}");
        assert_eq!(
            eval_value(&session, "var c = {}; c.self = c; console.log(c)"),
            "[object Object]"
        );
    }

    #[test]
    fn test_print_and_script_args() {
        let session = ready_session();
        assert_eq!(eval_value(&session, "print('from', 'script')"), "undefined");
        assert_eq!(eval_value(&session, "Array.isArray(scriptArgs) && scriptArgs.length"), "0");
    }

    #[test]
    fn test_xhr_ready_state_constants() {
        let session = ready_session();
        let source = "[XMLHttpRequest.UNSENT, XMLHttpRequest.OPENED, XMLHttpRequest.HEADERS_RECEIVED, XMLHttpRequest.LOADING, XMLHttpRequest.DONE].join()";
        assert_eq!(eval_value(&session, source), "0,1,2,3,4");
    }

    // ========================================================================
    // Host Bridge
    // ========================================================================

    #[test]
    fn test_fetch_routes_through_host() {
        let response = HttpResponse::new(200, "OK", "https://example.com/data")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"answer":42}"#)
            .to_json()
            .unwrap();
        let host = RecordingHost::answering(response);
        let session = session_with(host.clone());

        let source = r#"
            fetch('https://example.com/data', { method: 'POST', body: 'q=1', headers: { 'X-Test': 'yes' } })
                .then(r => r.json().then(data => [r.status, r.ok, r.headers.get('Content-Type'), data.answer].join('|')))
        "#;
        assert_eq!(eval_value(&session, source), "200|true|application/json|42");

        let requests = host.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "https://example.com/data");

        let options = HttpRequestOptions::from_json(&requests[0].1).unwrap();
        assert_eq!(options.method, "POST");
        assert_eq!(options.body.as_deref(), Some("q=1"));
        assert_eq!(options.headers.get("X-Test").map(String::as_str), Some("yes"));
        assert_eq!(options.timeout, 30000);
        assert_eq!(options.redirect, "follow");
        assert_eq!(options.credentials, "same-origin");
    }

    #[test]
    fn test_fetch_text_body() {
        let response = HttpResponse::new(404, "Not Found", "https://example.com/missing")
            .with_body("gone")
            .to_json()
            .unwrap();
        let session = session_with(RecordingHost::answering(response));

        let source = "fetch('https://example.com/missing').then(r => r.text().then(t => r.ok + ':' + r.status + ':' + t))";
        assert_eq!(eval_value(&session, source), "false:404:gone");
    }

    #[test]
    fn test_fetch_empty_document_is_network_failure() {
        let session = session_with(RecordingHost::answering("{}".to_string()));
        let failure = session
            .evaluate("fetch('https://example.com')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "Error: Network request failed");
    }

    #[test]
    fn test_fetch_host_failure_rejects() {
        let host = |_url: &str, _options: &str| -> jsbridge_common::Result<String> {
            Err(BridgeError::HostBridge("connection refused".to_string()))
        };
        let session = session_with(Arc::new(host));
        let failure = session
            .evaluate("fetch('https://example.com')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "InternalError: HTTP request failed");
    }

    #[test]
    fn test_fetch_without_host_rejects() {
        let session = ready_session();
        let failure = session
            .evaluate("fetch('https://example.com')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "ReferenceError: HTTP service not available");
    }

    #[test]
    fn test_direct_binding_call_without_host_is_host_bridge_failure() {
        let session = ready_session();
        let failure = session
            .evaluate("_nativeHttpRequest('https://example.com', '{}')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::HostBridge);
        assert_eq!(failure.message, "ReferenceError: HTTP service not available");
    }

    #[test]
    fn test_binding_parses_host_json() {
        let session = session_with(RecordingHost::answering(r#"{"status":201,"body":"made"}"#.to_string()));
        let source = "var r = _nativeHttpRequest('https://example.com'); r.status + ' ' + r.body";
        assert_eq!(eval_value(&session, source), "201 made");
    }

    #[test]
    fn test_binding_invalid_host_json_is_host_bridge_failure() {
        let host = RecordingHost::answering("not json".to_string());
        let session = session_with(host.clone());
        let failure = session
            .evaluate("_nativeHttpRequest('http://a')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::HostBridge);
        assert_eq!(failure.message, "InternalError: HTTP request failed");
        assert_eq!(host.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_invalid_host_json_rejects() {
        let session = session_with(RecordingHost::answering("not json".to_string()));
        let failure = session
            .evaluate("fetch('http://a')")
            .into_result()
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "InternalError: HTTP request failed");
    }

    #[test]
    fn test_xhr_success() {
        let response = HttpResponse::new(200, "OK", "https://example.com")
            .with_body("payload")
            .to_json()
            .unwrap();
        let host = RecordingHost::answering(response);
        let session = session_with(host.clone());

        let source = r#"
            var states = [];
            var xhr = new XMLHttpRequest();
            xhr.onreadystatechange = function() { states.push(xhr.readyState); };
            xhr.open('PUT', 'https://example.com', true);
            xhr.setRequestHeader('Accept', 'text/plain');
            xhr.send('data');
            [states.join(''), xhr.status, xhr.statusText, xhr.responseText].join('|')
        "#;
        assert_eq!(eval_value(&session, source), "124|200|OK|payload");

        let requests = host.requests.lock().unwrap();
        let options = HttpRequestOptions::from_json(&requests[0].1).unwrap();
        assert_eq!(options.method, "PUT");
        assert_eq!(options.body.as_deref(), Some("data"));
        assert_eq!(options.headers.get("Accept").map(String::as_str), Some("text/plain"));
    }

    #[test]
    fn test_xhr_failure_reports_status_zero() {
        let session = ready_session();
        let source = r#"
            var xhr = new XMLHttpRequest();
            xhr.open('GET', 'https://example.com');
            xhr.send();
            [xhr.readyState, xhr.status, xhr.statusText].join('|')
        "#;
        assert_eq!(eval_value(&session, source), "4|0|Error");
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[test]
    fn test_evaluate_before_initialize() {
        let session = EngineSession::new(None);
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_ready());

        let outcome = session.evaluate("1+2");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::EngineNotReady));
        assert_eq!(outcome.to_host_string(), "Error: QuickJS not initialized");
        assert_eq!(
            session.evaluate_bytecode(&[1, 2, 3]).failure_kind(),
            Some(FailureKind::EngineNotReady)
        );
        assert_eq!(
            session.compile("1").unwrap_err().kind,
            FailureKind::EngineNotReady
        );
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let mut session = ready_session();
        eval_value(&session, "var kept = 'still here';");
        session.initialize(EngineLimits::default()).unwrap();
        assert_eq!(eval_value(&session, "kept"), "still here");
    }

    #[test]
    fn test_initialize_rejects_invalid_limits() {
        let mut session = EngineSession::new(None);
        let err = session
            .initialize(EngineLimits::new().with_memory_limit(0))
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
        assert!(!session.is_ready());
    }

    #[test]
    fn test_reset_discards_globals_and_reinstalls_polyfills() {
        let mut session = ready_session();
        eval_value(&session, "globalThis.keep = 1;");
        session.reset().unwrap();

        assert!(session.is_ready());
        let failure = session.evaluate("keep").into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert!(failure.message.contains("ReferenceError"));

        assert_eq!(eval_value(&session, "console.log('back')"), "back");
        assert_eq!(eval_value(&session, "typeof fetch"), "function");
    }

    #[test]
    fn test_reset_before_initialize() {
        let mut session = EngineSession::new(None);
        assert!(matches!(session.reset(), Err(BridgeError::NotInitialized)));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut session = ready_session();
        session.teardown();
        assert_eq!(session.state(), SessionState::Destroyed);
        session.teardown();
        assert_eq!(session.state(), SessionState::Destroyed);
        assert_eq!(
            session.evaluate("1").failure_kind(),
            Some(FailureKind::EngineNotReady)
        );
        assert!(matches!(session.reset(), Err(BridgeError::NotInitialized)));
    }

    #[test]
    fn test_reinitialize_after_teardown() {
        let mut session = ready_session();
        eval_value(&session, "var old = 1;");
        session.teardown();
        session.initialize(EngineLimits::default()).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(eval_value(&session, "typeof old"), "undefined");
    }

    #[test]
    fn test_memory_stats() {
        let mut session = EngineSession::new(None);
        assert!(session.memory_stats().is_none());

        let limits = EngineLimits::new().with_memory_limit(32 * 1024 * 1024);
        session.initialize(limits).unwrap();
        assert_eq!(session.limits(), limits);

        let stats = session.memory_stats().unwrap();
        assert!(stats.memory_used_size > 0);
        assert!(stats.object_count > 0);
        session.run_gc();

        session.teardown();
        assert!(session.memory_stats().is_none());
    }

    #[test]
    fn test_memory_limit_surfaces_as_failure() {
        let mut session = EngineSession::new(None);
        let limits = EngineLimits::new()
            .with_memory_limit(4 * 1024 * 1024)
            .with_gc_threshold(256 * 1024);
        session.initialize(limits).unwrap();

        let outcome = session.evaluate("var hoard = []; while (true) { hoard.push(new Array(100000).fill(1)); }");
        assert!(!outcome.is_success());

        // The failed allocation must not poison the session.
        session.reset().unwrap();
        assert_eq!(eval_value(&session, "1+1"), "2");
    }

    // ========================================================================
    // Bytecode
    // ========================================================================

    #[test]
    fn test_bytecode_matches_source_evaluation() {
        let session = ready_session();
        let scripts = [
            "1+2",
            "'abc'.toUpperCase()",
            "[1, 2, 3].map(x => x * 2)",
            "Promise.resolve('settled')",
            "console.log('via', 'bytecode')",
        ];

        for script in scripts {
            let unit = session.compile(script).unwrap();
            assert_eq!(
                session.evaluate_bytecode(unit.as_bytes()),
                session.evaluate(script),
                "{}",
                script
            );
        }
    }

    #[test]
    fn test_bytecode_runs_each_time() {
        let session = ready_session();
        eval_value(&session, "var runs = 0;");
        let unit = session.compile("runs += 1").unwrap();
        assert_eq!(session.evaluate_bytecode(unit.as_bytes()).as_value(), Some("1"));
        assert_eq!(session.evaluate_bytecode(unit.as_bytes()).as_value(), Some("2"));
    }

    #[test]
    fn test_bytecode_failures_match_source() {
        let session = ready_session();
        let unit = session.compile("throw new Error('compiled')").unwrap();
        let failure = session.evaluate_bytecode(unit.as_bytes()).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RuntimeError);
        assert_eq!(failure.message, "Error: compiled");

        let unit = session.compile("Promise.reject('no')").unwrap();
        let failure = session.evaluate_bytecode(unit.as_bytes()).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RejectedPromise);
        assert_eq!(failure.message, "no");
    }

    #[test]
    fn test_bytecode_reruns_and_tears_down_cleanly() {
        let mut session = ready_session();
        let unit = session
            .compile("function square(x) { return x * x; } square(7) - 42")
            .unwrap();
        for _ in 0..3 {
            assert_eq!(eval_value_bytecode(&session, unit.as_bytes()), "7");
        }
        session.teardown();
        assert_eq!(session.state(), SessionState::Destroyed);

        session.initialize(EngineLimits::default()).unwrap();
        let unit = session.compile("'compiled ' + (6 * 7)").unwrap();
        assert_eq!(eval_value_bytecode(&session, unit.as_bytes()), "compiled 42");
    }

    #[test]
    fn test_compile_syntax_error() {
        let session = ready_session();
        let failure = session.compile("let = ;").unwrap_err();
        assert_eq!(failure.kind, FailureKind::SyntaxError);
        assert!(failure.message.contains("SyntaxError"));
    }

    #[test]
    fn test_compile_does_not_run_script() {
        let session = ready_session();
        session.compile("var sideEffect = 'ran';").unwrap();
        assert_eq!(eval_value(&session, "typeof sideEffect"), "undefined");
    }

    #[test]
    fn test_empty_bytecode() {
        let session = ready_session();
        let outcome = session.evaluate_bytecode(&[]);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Codec));
        assert_eq!(outcome.to_host_string(), "Error: Empty bytecode");
    }

    #[test]
    fn test_corrupt_bytecode() {
        let session = ready_session();
        let mut bytes = session.compile("1+2").unwrap().into_bytes();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0x5a;

        let outcome = session.evaluate_bytecode(&bytes);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Codec));
        assert_eq!(eval_value(&session, "1+2"), "3");
    }

    #[test]
    fn test_truncated_bytecode() {
        let session = ready_session();
        let bytes = session.compile("'some longer script text'.length").unwrap().into_bytes();
        let outcome = session.evaluate_bytecode(&bytes[..bytes.len() - 3]);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Codec));
    }

    #[test]
    fn test_foreign_bytes() {
        let session = ready_session();
        let outcome = session.evaluate_bytecode(b"MOCK_BYTECODE_1+2");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Codec));
    }

    #[test]
    fn test_sealed_garbage_rejected_by_reader() {
        let session = ready_session();
        let bytes = seal(b"this is not quickjs bytecode");
        let failure = session.evaluate_bytecode(&bytes).into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::Codec);
        assert!(failure.message.starts_with("Failed to read bytecode"));
    }

    #[test]
    fn test_bytecode_survives_reset_and_sessions() {
        let mut session = ready_session();
        let unit = session.compile("6 * 7").unwrap();

        session.reset().unwrap();
        assert_eq!(session.evaluate_bytecode(unit.as_bytes()).as_value(), Some("42"));

        let other = ready_session();
        assert_eq!(other.evaluate_bytecode(unit.as_bytes()).as_value(), Some("42"));
    }
}
