//! The step contract shared by every action a scenario can run.

use crate::context::ExecutionContext;
use crate::validator::HeaderMismatch;
use async_trait::async_trait;
use thiserror::Error;

/// A single unit of test action.
///
/// A runner holds steps as `Box<dyn Step>` and never depends on the
/// concrete type. `run` is called at most once per scenario execution;
/// `cleanup` is called afterwards regardless of the outcome.
#[async_trait]
pub trait Step: Send + Sync {
    /// Perform the step against the shared context.
    async fn run(&mut self, ctx: &mut ExecutionContext) -> Result<(), StepError>;

    /// Release anything acquired by `run`.
    ///
    /// Must be a no-op when `run` never ran or failed early, and safe to
    /// call more than once.
    async fn cleanup(&mut self) {}
}

/// Why a step did not succeed.
#[derive(Debug, Error)]
pub enum StepError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The target could not be reached or did not answer in time.
    #[error("request to 127.0.0.1:{port} could not complete: {source}")]
    Transport {
        port: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("error code for :{port}: {code}")]
    Status { port: u16, code: u16 },

    #[error("failed to read response body from :{port}: {source}")]
    BodyRead {
        port: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("got body {got:?}, want {want:?}")]
    BodyMismatch { got: String, want: String },

    #[error("{}", join_mismatches(.0))]
    Headers(Vec<HeaderMismatch>),
}

impl StepError {
    /// `true` when the target answered but the response did not match.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            StepError::Status { .. }
                | StepError::BodyMismatch { .. }
                | StepError::Headers(_)
        )
    }
}

fn join_mismatches(mismatches: &[HeaderMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
