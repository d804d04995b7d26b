//! Trial-by-trial state machine. Owns every piece of mutable experiment state
//! (plan, current assignment, ledger, RNG); all transitions go through the
//! methods here, never through the UI loop directly.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Tuning};
use crate::ledger::{now_timestamp, ParticipantId, ResultRecord, ResultsLedger, Side};
use crate::plan::{build_trial_list, TrialPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Trial at this plan index is loaded and waiting for a judgment.
    AwaitingJudgment(usize),
    Completed,
}

/// One side of the current trial: the stimulus shown there and its tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SidePlan {
    pub stimulus_key: String,
    pub tuning: Tuning,
}

/// Ephemeral per-trial counterbalancing record. Overwritten on every trial
/// advance; its only lasting output is the `ResultRecord` derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialAssignment {
    pub trial_index: usize,
    pub condition_id: String,
    pub side_a: SidePlan,
    pub side_b: SidePlan,
}

impl TrialAssignment {
    /// The positional-choice to semantic-outcome mapping. A raw A/B click is
    /// never stored without going through this.
    pub fn tuning_for(&self, side: Side) -> Tuning {
        match side {
            Side::A => self.side_a.tuning,
            Side::B => self.side_b.tuning,
        }
    }

    pub fn key_for(&self, side: Side) -> &str {
        match side {
            Side::A => &self.side_a.stimulus_key,
            Side::B => &self.side_b.stimulus_key,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no side selected; select side A or B before confirming")]
    NoSelection,
    #[error("no trial is awaiting a judgment")]
    NotAwaitingJudgment,
}

pub struct ExperimentSession<R: Rng> {
    catalog: Catalog,
    repetitions: usize,
    plan: TrialPlan,
    phase: Phase,
    current: Option<TrialAssignment>,
    ledger: ResultsLedger,
    participant: ParticipantId,
    rng: R,
}

impl<R: Rng> ExperimentSession<R> {
    pub fn new(catalog: Catalog, repetitions: usize, participant: ParticipantId, rng: R) -> Self {
        Self {
            catalog,
            repetitions,
            plan: TrialPlan::empty(),
            phase: Phase::NotStarted,
            current: None,
            ledger: ResultsLedger::new(),
            participant,
            rng,
        }
    }

    /// Build a fresh randomized plan, clear the ledger, load trial 0.
    pub fn start(&mut self) {
        let plan = build_trial_list(self.catalog.conditions(), self.repetitions, &mut self.rng);
        self.start_with_plan(plan);
    }

    /// Run over an externally prepared plan (fixed orders, replays).
    pub fn start_with_plan(&mut self, plan: TrialPlan) {
        self.plan = plan;
        self.ledger = ResultsLedger::new();
        self.current = None;
        info!(
            total = self.plan.len(),
            participant = %self.participant,
            "experiment started"
        );
        self.load_trial(0);
    }

    /// Record the participant's positional choice for the current trial,
    /// translate it to the tuning it corresponds to, append to the ledger and
    /// advance. `None` (nothing selected) is rejected without a transition.
    pub fn record_judgment(&mut self, side: Option<Side>) -> Result<ResultRecord, SessionError> {
        let Phase::AwaitingJudgment(index) = self.phase else {
            return Err(SessionError::NotAwaitingJudgment);
        };
        let side = side.ok_or(SessionError::NoSelection)?;
        let assignment = self.current.as_ref().ok_or(SessionError::NotAwaitingJudgment)?;

        let chosen = assignment.tuning_for(side);
        let record = ResultRecord {
            participant_id: self.participant.as_str().to_string(),
            trial_number: index + 1,
            condition_id: assignment.condition_id.clone(),
            side_a_tuning: assignment.side_a.tuning,
            side_b_tuning: assignment.side_b.tuning,
            user_choice_side: side,
            chosen_tuning: chosen,
            timestamp: now_timestamp(),
        };
        self.ledger.append(record.clone());
        debug!(
            trial = index + 1,
            side = ?side,
            chosen = chosen.label(),
            "judgment recorded"
        );

        self.load_trial(index + 1);
        Ok(record)
    }

    /// Load the trial at `start_index`, skipping entries whose condition or
    /// stimulus cannot be resolved (a catalog/plan mismatch must not abort the
    /// whole session), and completing when the plan is exhausted.
    fn load_trial(&mut self, start_index: usize) {
        let mut index = start_index;
        while let Some(entry) = self.plan.get(index).cloned() {
            match self.assign(index, &entry.condition_id) {
                Some(assignment) => {
                    debug!(
                        trial = index + 1,
                        condition = %assignment.condition_id,
                        "trial loaded"
                    );
                    self.current = Some(assignment);
                    self.phase = Phase::AwaitingJudgment(index);
                    return;
                }
                None => {
                    warn!(
                        trial = index + 1,
                        condition = %entry.condition_id,
                        "condition not in catalog; skipping trial"
                    );
                    index += 1;
                }
            }
        }
        self.phase = Phase::Completed;
        self.current = None;
        info!(recorded = self.ledger.len(), "experiment completed");
    }

    /// Independent fair coin per trial decides which side gets JI; the other
    /// side always gets the complement. Deliberately not balanced across the
    /// session.
    fn assign(&mut self, index: usize, condition_id: &str) -> Option<TrialAssignment> {
        self.catalog.condition(condition_id)?;
        let a_tuning = if self.rng.random_bool(0.5) {
            Tuning::Ji
        } else {
            Tuning::Tet
        };
        let b_tuning = a_tuning.complement();
        let a = self.catalog.variant(condition_id, a_tuning)?;
        let b = self.catalog.variant(condition_id, b_tuning)?;
        Some(TrialAssignment {
            trial_index: index,
            condition_id: condition_id.to_string(),
            side_a: SidePlan {
                stimulus_key: a.key.clone(),
                tuning: a_tuning,
            },
            side_b: SidePlan {
                stimulus_key: b.key.clone(),
                tuning: b_tuning,
            },
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> Option<&TrialAssignment> {
        self.current.as_ref()
    }

    pub fn ledger(&self) -> &ResultsLedger {
        &self.ledger
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn plan(&self) -> &TrialPlan {
        &self.plan
    }

    pub fn total_trials(&self) -> usize {
        self.plan.len()
    }
}
