//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod rule_service;
pub mod schedule_service;

pub use rule_service::AutomationRuleService;
pub use schedule_service::ScheduleService;
