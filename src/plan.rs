//! Trial ordering: a balanced multiset of conditions, shuffled under a
//! no-immediate-repeat constraint via rejection sampling.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::catalog::Condition;

/// Re-shuffle budget before giving up on the adjacency constraint.
pub const MAX_SHUFFLE_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPlanEntry {
    pub condition_id: String,
}

#[derive(Debug, Clone)]
pub struct TrialPlan {
    entries: Vec<TrialPlanEntry>,
    constraint_satisfied: bool,
}

impl TrialPlan {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            constraint_satisfied: true,
        }
    }

    /// Plan over an explicit, pre-ordered entry list (fixed replication orders).
    /// The adjacency constraint is not re-checked here.
    pub fn from_entries(entries: Vec<TrialPlanEntry>) -> Self {
        Self {
            entries,
            constraint_satisfied: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrialPlanEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TrialPlanEntry] {
        &self.entries
    }

    /// False when the retry budget ran out and the returned order may contain
    /// immediate repeats (best effort, never fatal).
    pub fn constraint_satisfied(&self) -> bool {
        self.constraint_satisfied
    }
}

/// Expand `repetitions` copies of each condition and shuffle (Fisher-Yates)
/// until no two adjacent entries share a condition, or the budget runs out.
///
/// With the standard 6-condition catalog and 3 repetitions the constraint is
/// almost always met within a few attempts. Pathological inputs (one condition,
/// repetitions far above the condition count) can be unsatisfiable; those
/// return the last permutation with the satisfied flag lowered.
pub fn build_trial_list<R: Rng + ?Sized>(
    conditions: &[Condition],
    repetitions: usize,
    rng: &mut R,
) -> TrialPlan {
    let mut ids: Vec<String> = Vec::with_capacity(conditions.len() * repetitions);
    for _ in 0..repetitions {
        ids.extend(conditions.iter().map(|c| c.id.clone()));
    }

    let mut satisfied = false;
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        ids.shuffle(rng);
        if !has_adjacent_repeat(&ids) {
            satisfied = true;
            break;
        }
    }
    if !satisfied {
        warn!(
            attempts = MAX_SHUFFLE_ATTEMPTS,
            "no-immediate-repeat constraint not met; using last shuffle"
        );
    }

    TrialPlan {
        entries: ids
            .into_iter()
            .map(|condition_id| TrialPlanEntry { condition_id })
            .collect(),
        constraint_satisfied: satisfied,
    }
}

fn has_adjacent_repeat(ids: &[String]) -> bool {
    ids.windows(2).any(|w| w[0] == w[1])
}
