#![forbid(unsafe_code)]

//! Headless driver for `surprise-core`: builds an in-memory scene, plays the
//! reveal over virtual time, scripts one trigger press, and reports the final
//! node states.

pub mod cli;
pub mod error;
pub mod simulate;

pub use cli::{Cli, run, run_from_env};
pub use error::{DemoError, Result};
