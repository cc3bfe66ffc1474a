pub mod codec;
pub mod evaluator;
pub mod polyfills;

mod bindings;
mod conversions;

#[cfg(test)]
mod tests;

pub use bindings::{HTTP_FAILED_MESSAGE, HTTP_UNAVAILABLE_MESSAGE};
