//! # autoapply-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ScheduleRepository` — schedule CRUD, due-query and conditional update
//!   - `AutomationRuleRepository` — CRUD for automation rules
//!   - `OutcomeStore` — append & query execution outcomes
//!   - `ApplicationSubmitter` — submits a job application
//!   - `Notifier` — best-effort user notifications
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ScheduleService`, `AutomationRuleService` — user-facing CRUD
//!   - `AutomationEngine` — sweeps due schedules and applies rules
//!   - `Scheduler` — drives the engine on a fixed cadence
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `autoapply-domain` only (plus `tokio` for timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod automation_engine;
pub mod error;
pub mod ports;
pub mod rule_evaluator;
pub mod scheduler;
pub mod services;

#[cfg(test)]
mod test_support;
