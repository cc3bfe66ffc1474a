pub mod error;
pub mod http;
pub mod outcome;


pub use error::{BridgeError, Result};
pub use http::{HttpRequestOptions, HttpResponse};
pub use outcome::{ExecutionOutcome, Failure, FailureKind, NOT_INITIALIZED_MESSAGE};
