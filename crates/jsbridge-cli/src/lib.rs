//! # jsbridge CLI
//!
//! Command-line host for the jsbridge engine. Runs scripts and compiled
//! bytecode on a single [`EngineSession`](jsbridge_engine::EngineSession),
//! the same way the Android bridge does, with a `reqwest`-backed network
//! handler standing in for the app's.
//!
//! ## Key Commands
//!
//! - `jsbridge run <file>`: evaluate a script file
//! - `jsbridge eval <source>`: evaluate inline source
//! - `jsbridge compile <file> -o <out>`: write a compiled unit
//! - `jsbridge exec <file>`: run a compiled unit
//! - `jsbridge repl`: interactive session (`.reset`, `.mem`, `.exit`)

pub mod config;
pub mod http_host;
