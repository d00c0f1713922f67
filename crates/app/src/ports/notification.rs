//! Notification port — best-effort messages to a user.

use std::future::Future;

use autoapply_domain::id::UserId;

/// A notification could not be delivered.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed")]
pub struct NotificationError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// Delivers a message to a user. Callers treat failures as non-fatal.
pub trait Notifier {
    fn notify(
        &self,
        user_id: UserId,
        message: &str,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for std::sync::Arc<T> {
    fn notify(
        &self,
        user_id: UserId,
        message: &str,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send {
        (**self).notify(user_id, message)
    }
}
