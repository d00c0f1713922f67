//! [`ApplicationSubmitter`] that POSTs applications to a remote endpoint.

use std::time::Duration;

use serde::Serialize;

use autoapply_app::ports::{ApplicationSubmitter, SubmissionError};
use autoapply_domain::id::UserId;

use crate::rotation::KeyRotation;

#[derive(Serialize)]
struct SubmissionPayload<'a> {
    user_id: UserId,
    job_reference: &'a str,
}

/// Submits applications as JSON to a fixed endpoint.
///
/// Each request carries the next key of the [`KeyRotation`] as a bearer
/// token. With no keys configured the request goes out unauthenticated.
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
    keys: KeyRotation,
}

impl HttpSubmitter {
    /// Build a submitter for `endpoint`.
    ///
    /// `timeout` bounds a single request at the HTTP level, independently of
    /// the engine's own submission timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        keys: KeyRotation,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: crate::client(timeout)?,
            endpoint: endpoint.into(),
            keys,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ApplicationSubmitter for HttpSubmitter {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn submit(&self, user_id: UserId, job_reference: &str) -> Result<(), SubmissionError> {
        let mut request = self.client.post(&self.endpoint).json(&SubmissionPayload {
            user_id,
            job_reference,
        });
        if let Some(key) = self.keys.next_key() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            tracing::debug!(error = %err, "submission request failed");
            SubmissionError::Transport(Box::new(err))
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "submission rejected");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = status.as_u16(), "submission accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{TestServer, closed_url};
    use axum::http::StatusCode;

    fn submitter(url: String, keys: &[&str]) -> HttpSubmitter {
        HttpSubmitter::new(
            url,
            KeyRotation::new(keys.iter().map(ToString::to_string)),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_post_application_as_json() {
        let server = TestServer::start(StatusCode::OK).await;
        let user_id = UserId::new();

        submitter(server.url(), &["k1"])
            .submit(user_id, "acme/backend-42")
            .await
            .unwrap();

        let received = server.received();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].body,
            serde_json::json!({
                "user_id": user_id.to_string(),
                "job_reference": "acme/backend-42",
            })
        );
        assert_eq!(received[0].authorization.as_deref(), Some("Bearer k1"));
    }

    #[tokio::test]
    async fn should_rotate_keys_between_requests() {
        let server = TestServer::start(StatusCode::ACCEPTED).await;
        let submitter = submitter(server.url(), &["k1", "k2"]);

        for _ in 0..3 {
            submitter.submit(UserId::new(), "job").await.unwrap();
        }

        let keys: Vec<_> = server
            .received()
            .into_iter()
            .map(|r| r.authorization.unwrap())
            .collect();
        assert_eq!(keys, vec!["Bearer k1", "Bearer k2", "Bearer k1"]);
    }

    #[tokio::test]
    async fn should_send_without_authorization_when_no_keys() {
        let server = TestServer::start(StatusCode::OK).await;

        submitter(server.url(), &[])
            .submit(UserId::new(), "job")
            .await
            .unwrap();

        assert_eq!(server.received()[0].authorization, None);
    }

    #[tokio::test]
    async fn should_report_rejection_status() {
        let server = TestServer::start(StatusCode::SERVICE_UNAVAILABLE).await;

        let err = submitter(server.url(), &["k1"])
            .submit(UserId::new(), "job")
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Rejected { status: 503 }));
    }

    #[tokio::test]
    async fn should_report_transport_error_when_unreachable() {
        let err = submitter(closed_url().await, &["k1"])
            .submit(UserId::new(), "job")
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Transport(_)));
    }
}
