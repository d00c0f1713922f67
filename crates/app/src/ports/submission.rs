//! Submission port — hands a job application to whatever actually applies.

use std::future::Future;

use autoapply_domain::id::UserId;

/// Why a submission attempt did not go through.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The receiving side answered but refused the application.
    #[error("submission rejected with status {status}")]
    Rejected { status: u16 },

    /// The request never got a usable answer.
    #[error("submission transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Submits a job application on behalf of a user.
///
/// Implementations need not bound their own latency; the engine wraps every
/// call in a timeout.
pub trait ApplicationSubmitter {
    fn submit(
        &self,
        user_id: UserId,
        job_reference: &str,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send;
}

impl<T: ApplicationSubmitter + Send + Sync> ApplicationSubmitter for std::sync::Arc<T> {
    fn submit(
        &self,
        user_id: UserId,
        job_reference: &str,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send {
        (**self).submit(user_id, job_reference)
    }
}
