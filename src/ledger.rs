//! Append-only record of completed trials, with the exact field names the
//! collection endpoint expects.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Tuning;

/// Display position of a stimulus within a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// Opaque per-session identifier: `P_<unix-millis>_<5 alphanumeric chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let suffix: String = (0..5)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        Self(format!("P_{}_{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed trial. `chosen_tuning` is the de-anonymized outcome: the
/// tuning system the participant actually picked, independent of which side
/// it was shown on. Field renames are the wire format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "participantId")]
    pub participant_id: String,
    #[serde(rename = "trialNumber")]
    pub trial_number: usize,
    #[serde(rename = "conditionId")]
    pub condition_id: String,
    #[serde(rename = "sideA_tuning")]
    pub side_a_tuning: Tuning,
    #[serde(rename = "sideB_tuning")]
    pub side_b_tuning: Tuning,
    #[serde(rename = "userChoiceSide")]
    pub user_choice_side: Side,
    #[serde(rename = "chosenTuning")]
    pub chosen_tuning: Tuning,
    pub timestamp: String,
}

/// RFC 3339 timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Insertion-ordered, append-only. No deduplication, no mutation.
#[derive(Debug, Clone, Default)]
pub struct ResultsLedger {
    records: Vec<ResultRecord>,
}

impl ResultsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn all(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn participant_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = ParticipantId::generate(&mut rng);
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "P");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ledger_preserves_insertion_order() {
        let mut ledger = ResultsLedger::new();
        assert!(ledger.is_empty());
        for n in 1..=3 {
            ledger.append(ResultRecord {
                participant_id: "P_0_aaaaa".into(),
                trial_number: n,
                condition_id: "M3_sine".into(),
                side_a_tuning: Tuning::Ji,
                side_b_tuning: Tuning::Tet,
                user_choice_side: Side::A,
                chosen_tuning: Tuning::Ji,
                timestamp: now_timestamp(),
            });
        }
        assert_eq!(ledger.len(), 3);
        let numbers: Vec<usize> = ledger.all().iter().map(|r| r.trial_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
