//! `tracing` output routed to logcat under the `QuickJS` tag.
//!
//! Each formatted event becomes one `__android_log_write` call at the
//! priority matching its level. Off Android the lines go to stderr, which
//! keeps host-side tests readable.

use std::io::{self, Write};
use std::sync::Once;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Logcat tag for every line written by this library.
pub const LOG_TAG: &str = "QuickJS";

// android/log.h priorities
const ANDROID_LOG_VERBOSE: i32 = 2;
const ANDROID_LOG_DEBUG: i32 = 3;
const ANDROID_LOG_INFO: i32 = 4;
const ANDROID_LOG_WARN: i32 = 5;
const ANDROID_LOG_ERROR: i32 = 6;

static INIT: Once = Once::new();

/// Installs the global subscriber once per process.
///
/// `RUST_LOG` is honoured when set; otherwise `info`. If another subscriber
/// is already installed it is left in place.
pub fn init() {
    INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(LogcatMakeWriter)
            .with_ansi(false)
            .without_time()
            .try_init();
    });
}

/// Maps a `tracing` level to a logcat priority.
pub fn priority_for(level: &Level) -> i32 {
    match *level {
        Level::TRACE => ANDROID_LOG_VERBOSE,
        Level::DEBUG => ANDROID_LOG_DEBUG,
        Level::INFO => ANDROID_LOG_INFO,
        Level::WARN => ANDROID_LOG_WARN,
        Level::ERROR => ANDROID_LOG_ERROR,
    }
}

/// Creates one [`LogcatWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogcatMakeWriter;

impl<'a> MakeWriter<'a> for LogcatMakeWriter {
    type Writer = LogcatWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogcatWriter::new(ANDROID_LOG_INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LogcatWriter::new(priority_for(meta.level()))
    }
}

/// Buffers one formatted event and emits it when dropped.
#[derive(Debug)]
pub struct LogcatWriter {
    priority: i32,
    buffer: Vec<u8>,
}

impl LogcatWriter {
    fn new(priority: i32) -> Self {
        Self {
            priority,
            buffer: Vec::new(),
        }
    }

    fn line(&self) -> String {
        String::from_utf8_lossy(&self.buffer)
            .trim_end()
            .replace('\0', "\u{FFFD}")
    }
}

impl Write for LogcatWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogcatWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        emit(self.priority, &self.line());
    }
}

#[cfg(target_os = "android")]
fn emit(priority: i32, line: &str) {
    use std::ffi::{c_char, c_int, CString};

    #[link(name = "log")]
    extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    let (Ok(tag), Ok(text)) = (CString::new(LOG_TAG), CString::new(line)) else {
        return;
    };
    // SAFETY: both pointers are valid NUL-terminated strings for the duration of the call.
    unsafe {
        __android_log_write(priority, tag.as_ptr(), text.as_ptr());
    }
}

#[cfg(not(target_os = "android"))]
fn emit(_priority: i32, line: &str) {
    let _ = writeln!(io::stderr(), "{}: {}", LOG_TAG, line);
}
