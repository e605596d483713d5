//! Verification steps for end-to-end proxy tests.
//!
//! A scenario runner owns an [`ExecutionContext`] and drives a sequence of
//! [`Step`] values through `run` and `cleanup`. [`HttpCall`] is the
//! call-and-assert step: it issues one request against a loopback port and
//! checks status, body and response headers.

pub mod config;
pub mod context;
pub mod http_call;
pub mod step;
pub mod validator;

pub use config::*;
pub use context::*;
pub use http_call::*;
pub use step::*;
pub use validator::{HeaderExpectation, HeaderMismatch, ANY, NONE};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
