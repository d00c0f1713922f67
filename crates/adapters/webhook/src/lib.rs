//! # autoapply-adapter-webhook
//!
//! Outbound HTTP adapter built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement `ApplicationSubmitter` by POSTing applications to a
//!   submission endpoint, authenticated with a rotating bearer key
//! - Implement `Notifier` by POSTing reminders to an optional webhook
//!
//! ## Dependency rule
//! Depends on `autoapply-app` (for port traits) and `autoapply-domain`
//! (for identifiers). The `app` and `domain` crates must never reference
//! this adapter.

pub mod notifier;
pub mod rotation;
pub mod submitter;

#[cfg(test)]
mod test_server;

pub use notifier::WebhookNotifier;
pub use rotation::KeyRotation;
pub use submitter::HttpSubmitter;

/// `User-Agent` sent with every outbound request.
const USER_AGENT: &str = concat!("autoapply/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the collaborators of this crate.
fn client(timeout: std::time::Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
