//! Automation engine — sweeps due schedules and applies the owners' rules.
//!
//! A sweep finds every pending schedule whose submit time has passed, claims
//! each one with a conditional `pending → processing` update, evaluates the
//! owner's enabled rules and executes the selected action. The result is
//! written back with a second conditional update (`processing → …`) and an
//! [`ExecutionOutcome`] is appended for every claimed schedule, except a
//! suppressed reminder, which only releases the claim.
//!
//! Claims are the only coordination between concurrent sweeps: a lost claim
//! means another worker owns the schedule, and the loser does nothing.

use std::time::Duration;

use autoapply_domain::automation::RuleAction;
use autoapply_domain::outcome::{ExecutionOutcome, OutcomeResult};
use autoapply_domain::schedule::{ApplicationSchedule, FailureDisposition, ScheduleStatus};
use autoapply_domain::time::Timestamp;
use chrono::TimeDelta;

use crate::error::{EngineError, describe};
use crate::ports::{
    ApplicationSubmitter, AutomationRuleRepository, Notifier, OutcomeStore, ScheduleRepository,
};
use crate::rule_evaluator::{self, Decision};
use crate::scheduler::SweepRunner;

/// Tunables of the automation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Failed submissions retried before a schedule is marked `failed`.
    pub max_retries: u32,
    /// Delay added to `now` when a failed submission is rescheduled.
    pub backoff: Duration,
    /// Upper bound for one submission call.
    pub submission_timeout: Duration,
    /// Minimum gap between two reminders for the same schedule.
    pub reminder_suppression: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(5 * 60),
            submission_timeout: Duration::from_secs(30),
            reminder_suppression: Duration::from_secs(60 * 60),
        }
    }
}

/// Counters for one sweep.
///
/// `processed` is the number of due schedules looked at and always equals
/// the sum of the other counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub processed: usize,
    pub submitted: usize,
    pub retried: usize,
    pub failed: usize,
    pub reminded: usize,
    pub skipped: usize,
}

impl SweepReport {
    fn record(&mut self, disposition: Disposition) {
        self.processed += 1;
        match disposition {
            Disposition::Submitted => self.submitted += 1,
            Disposition::Retried => self.retried += 1,
            Disposition::Failed => self.failed += 1,
            Disposition::Reminded => self.reminded += 1,
            Disposition::Skipped => self.skipped += 1,
        }
    }
}

/// Where a single schedule ended up after the engine looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Submitted,
    Retried,
    Failed,
    Reminded,
    Skipped,
}

impl From<FailureDisposition> for Disposition {
    fn from(value: FailureDisposition) -> Self {
        match value {
            FailureDisposition::Retry => Self::Retried,
            FailureDisposition::Exhausted => Self::Failed,
        }
    }
}

/// What executing an action produced, before it is written back.
struct Attempt {
    next: ApplicationSchedule,
    /// `None` when nothing happened worth an outcome row.
    result: Option<OutcomeResult>,
    disposition: Disposition,
    detail: String,
}

/// Processes due schedules against the automation rules of their owners.
pub struct AutomationEngine<SR, RR, OS, S, N> {
    schedules: SR,
    rules: RR,
    outcomes: OS,
    submitter: S,
    notifier: N,
    config: EngineConfig,
}

impl<SR, RR, OS, S, N> AutomationEngine<SR, RR, OS, S, N>
where
    SR: ScheduleRepository + Send + Sync,
    RR: AutomationRuleRepository + Send + Sync,
    OS: OutcomeStore + Send + Sync,
    S: ApplicationSubmitter + Send + Sync,
    N: Notifier + Send + Sync,
{
    /// Create a new engine.
    pub fn new(
        schedules: SR,
        rules: RR,
        outcomes: OS,
        submitter: S,
        notifier: N,
        config: EngineConfig,
    ) -> Self {
        Self {
            schedules,
            rules,
            outcomes,
            submitter,
            notifier,
            config,
        }
    }

    /// Run one sweep at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] when the due schedules
    /// cannot be listed. Failures on individual schedules are logged and
    /// counted in the report instead.
    pub async fn process_due_schedules(&self) -> Result<SweepReport, EngineError> {
        self.process_due_schedules_at(autoapply_domain::time::now())
            .await
    }

    /// Run one sweep as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StoreUnavailable`] when the due schedules
    /// cannot be listed.
    #[tracing::instrument(skip(self))]
    pub async fn process_due_schedules_at(
        &self,
        now: Timestamp,
    ) -> Result<SweepReport, EngineError> {
        let due = self
            .schedules
            .find_due(now)
            .await
            .map_err(EngineError::StoreUnavailable)?;

        let mut report = SweepReport::default();
        for schedule in due {
            let disposition = self.process_schedule(schedule, now).await;
            report.record(disposition);
        }

        if report.processed > 0 {
            tracing::info!(
                processed = report.processed,
                submitted = report.submitted,
                retried = report.retried,
                failed = report.failed,
                reminded = report.reminded,
                skipped = report.skipped,
                "sweep finished"
            );
        }
        Ok(report)
    }

    #[tracing::instrument(skip_all, fields(schedule_id = %schedule.id))]
    async fn process_schedule(&self, schedule: ApplicationSchedule, now: Timestamp) -> Disposition {
        let claimed = match self.claim(schedule).await {
            Ok(claimed) => claimed,
            Err(EngineError::ClaimConflict(_)) => {
                tracing::debug!("schedule already claimed elsewhere");
                return Disposition::Skipped;
            }
            Err(err) => {
                tracing::warn!(error = %describe(&err), "could not claim schedule");
                return Disposition::Failed;
            }
        };

        match self.execute(&claimed, now).await {
            Ok((decision, attempt)) => self.finish(claimed, decision, attempt, now).await,
            Err(err) => self.account_error(claimed, &err, now).await,
        }
    }

    /// Move `schedule` from `pending` to `processing` unless someone else did.
    async fn claim(
        &self,
        mut schedule: ApplicationSchedule,
    ) -> Result<ApplicationSchedule, EngineError> {
        if schedule.transition_to(ScheduleStatus::Processing).is_err() {
            return Err(EngineError::ClaimConflict(schedule.id));
        }
        let claimed = self
            .schedules
            .conditional_update(&schedule, ScheduleStatus::Pending)
            .await
            .map_err(EngineError::StoreUnavailable)?;
        if claimed {
            Ok(schedule)
        } else {
            Err(EngineError::ClaimConflict(schedule.id))
        }
    }

    /// Pick the action for a claimed schedule and carry it out.
    async fn execute(
        &self,
        claimed: &ApplicationSchedule,
        now: Timestamp,
    ) -> Result<(Decision, Attempt), EngineError> {
        let rules = self
            .rules
            .get_enabled_for_user(claimed.user_id)
            .await
            .map_err(EngineError::StoreUnavailable)?;
        let decision = rule_evaluator::evaluate(claimed, &rules, now)?;
        tracing::debug!(action = %decision.action, rule_id = ?decision.rule_id, "rule decision");

        let mut next = claimed.clone();
        let attempt = match decision.action {
            RuleAction::AutoSubmit => self.submit(next, now).await?,
            RuleAction::SendReminder => self.remind(next, now).await?,
            RuleAction::Escalate => {
                let detail = match decision.rule_id {
                    Some(rule_id) => format!("escalated by rule {rule_id}"),
                    None => "escalated".to_string(),
                };
                next.escalate(detail.clone(), now).map_err(EngineError::InvalidState)?;
                Attempt {
                    next,
                    result: Some(OutcomeResult::Failure),
                    disposition: Disposition::Failed,
                    detail,
                }
            }
        };
        Ok((decision, attempt))
    }

    async fn submit(
        &self,
        mut next: ApplicationSchedule,
        now: Timestamp,
    ) -> Result<Attempt, EngineError> {
        let timeout = self.config.submission_timeout;
        let call = self.submitter.submit(next.user_id, &next.job_reference);
        let submitted = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(EngineError::SubmissionFailure(err)),
            Err(_) => Err(EngineError::SubmissionTimeout(timeout)),
        };

        match submitted {
            Ok(()) => {
                next.mark_submitted(now).map_err(EngineError::InvalidState)?;
                Ok(Attempt {
                    next,
                    result: Some(OutcomeResult::Success),
                    disposition: Disposition::Submitted,
                    detail: "application submitted".to_string(),
                })
            }
            Err(err) => {
                let detail = describe(&err);
                tracing::warn!(
                    error = %detail,
                    retry_count = next.retry_count,
                    "submission failed"
                );
                let disposition = self.record_failure(&mut next, detail.clone(), now)?;
                Ok(Attempt {
                    next,
                    result: Some(OutcomeResult::Failure),
                    disposition,
                    detail,
                })
            }
        }
    }

    async fn remind(
        &self,
        mut next: ApplicationSchedule,
        now: Timestamp,
    ) -> Result<Attempt, EngineError> {
        let window =
            TimeDelta::from_std(self.config.reminder_suppression).unwrap_or(TimeDelta::MAX);
        if next.touched_within(now, window) {
            tracing::debug!("reminder suppressed");
            next.release(None).map_err(EngineError::InvalidState)?;
            return Ok(Attempt {
                next,
                result: None,
                disposition: Disposition::Skipped,
                detail: "reminder suppressed".to_string(),
            });
        }

        let message = format!(
            "Your application for {} is waiting to be submitted",
            next.job_reference
        );
        if let Err(err) = self.notifier.notify(next.user_id, &message).await {
            tracing::warn!(error = %describe(&err), "reminder could not be delivered");
        }
        next.release(Some(now)).map_err(EngineError::InvalidState)?;
        Ok(Attempt {
            next,
            result: Some(OutcomeResult::Success),
            disposition: Disposition::Reminded,
            detail: "reminder sent".to_string(),
        })
    }

    fn record_failure(
        &self,
        next: &mut ApplicationSchedule,
        detail: String,
        now: Timestamp,
    ) -> Result<Disposition, EngineError> {
        let backoff = TimeDelta::from_std(self.config.backoff).unwrap_or(TimeDelta::MAX);
        next.record_failure(detail, now, self.config.max_retries, backoff)
            .map(Disposition::from)
            .map_err(EngineError::InvalidState)
    }

    /// Write the attempt back and append its outcome.
    ///
    /// Once the submission or the reminder went out, a failed write-back is
    /// retried once and then left alone: the schedule stays `processing`
    /// and the outcome records what really happened. Treating it as a
    /// failed attempt would requeue the schedule and send it again.
    async fn finish(
        &self,
        claimed: ApplicationSchedule,
        decision: Decision,
        attempt: Attempt,
        now: Timestamp,
    ) -> Disposition {
        let Attempt {
            next,
            result,
            disposition,
            detail,
        } = attempt;
        let side_effect = matches!(disposition, Disposition::Submitted | Disposition::Reminded);

        let mut written = self
            .schedules
            .conditional_update(&next, ScheduleStatus::Processing)
            .await;
        if side_effect && let Err(err) = &written {
            tracing::warn!(%err, "could not write schedule back, retrying once");
            written = self
                .schedules
                .conditional_update(&next, ScheduleStatus::Processing)
                .await;
        }

        let (result, disposition, detail) = match written {
            Ok(true) => (result, disposition, detail),
            Ok(false) => {
                tracing::info!("schedule changed while processing, result discarded");
                (
                    result.map(|_| OutcomeResult::Skipped),
                    Disposition::Skipped,
                    format!("schedule changed while processing; {detail}"),
                )
            }
            Err(err) if side_effect => {
                let err = EngineError::StoreUnavailable(err);
                tracing::error!(
                    error = %describe(&err),
                    "could not write schedule back, schedule left in processing"
                );
                (
                    result,
                    disposition,
                    format!("{detail}; schedule left in processing: {}", describe(&err)),
                )
            }
            Err(err) => {
                let err = EngineError::StoreUnavailable(err);
                tracing::warn!(error = %describe(&err), "could not write schedule back");
                return self.account_error(claimed, &err, now).await;
            }
        };

        if let Some(result) = result {
            self.append_outcome(ExecutionOutcome::new(
                next.id,
                result,
                decision.action,
                decision.rule_id,
                detail,
                now,
            ))
            .await;
        }
        disposition
    }

    /// Treat an unexpected error on a claimed schedule like a failed attempt.
    async fn account_error(
        &self,
        mut claimed: ApplicationSchedule,
        err: &EngineError,
        now: Timestamp,
    ) -> Disposition {
        let detail = describe(err);
        tracing::warn!(error = %detail, "processing schedule failed");

        let schedule_id = claimed.id;
        match self.record_failure(&mut claimed, detail.clone(), now) {
            Ok(_) => {
                if let Err(err) = self
                    .schedules
                    .conditional_update(&claimed, ScheduleStatus::Processing)
                    .await
                {
                    tracing::warn!(%err, "could not record failed attempt");
                }
            }
            Err(err) => {
                tracing::warn!(error = %describe(&err), "could not record failed attempt");
            }
        }

        self.append_outcome(ExecutionOutcome::new(
            schedule_id,
            OutcomeResult::Failure,
            RuleAction::AutoSubmit,
            None,
            detail,
            now,
        ))
        .await;
        Disposition::Failed
    }

    async fn append_outcome(&self, outcome: ExecutionOutcome) {
        let schedule_id = outcome.schedule_id;
        if let Err(err) = self.outcomes.append(outcome).await {
            tracing::warn!(%schedule_id, %err, "could not append execution outcome");
        }
    }
}

impl<SR, RR, OS, S, N> SweepRunner for AutomationEngine<SR, RR, OS, S, N>
where
    SR: ScheduleRepository + Send + Sync + 'static,
    RR: AutomationRuleRepository + Send + Sync + 'static,
    OS: OutcomeStore + Send + Sync + 'static,
    S: ApplicationSubmitter + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    fn run_sweep(&self) -> impl Future<Output = Result<SweepReport, EngineError>> + Send {
        self.process_due_schedules()
    }
}
