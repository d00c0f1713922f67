//! # autoapply-domain
//!
//! Pure domain model for the autoapply application-workflow engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Schedules** (time-triggered application submissions and their status machine)
//! - Define **Automation rules** (trigger → action mappings owned by a user)
//! - Define **Execution outcomes** (one audit record per engine attempt)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod outcome;
pub mod schedule;
