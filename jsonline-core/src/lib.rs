//! Pull the machine-readable result line out of captured tool output.

pub mod capture;
pub mod config;
pub mod error;
pub mod json_extract;

pub use capture::{capture, CapturedOutput, CommandSpec, StreamPreference};
pub use error::{Error, Result};
pub use json_extract::{decode_inline_json, extract_inline_json, extract_inline_value};
