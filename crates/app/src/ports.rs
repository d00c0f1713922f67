//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod notification;
pub mod outcome_store;
pub mod rule_repo;
pub mod schedule_repo;
pub mod submission;

pub use notification::{NotificationError, Notifier};
pub use outcome_store::OutcomeStore;
pub use rule_repo::AutomationRuleRepository;
pub use schedule_repo::ScheduleRepository;
pub use submission::{ApplicationSubmitter, SubmissionError};
