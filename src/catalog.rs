//! Static experimental conditions and the stimuli they resolve to.
//!
//! Each condition is an (interval, waveform) pairing. Every condition has
//! exactly two stimulus variants, one per tuning system, sharing the base
//! frequency and waveform and differing only in the upper note.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "M3")]
    MajorThird,
    #[serde(rename = "P5")]
    PerfectFifth,
}

impl Interval {
    pub fn label(self) -> &'static str {
        match self {
            Interval::MajorThird => "M3",
            Interval::PerfectFifth => "P5",
        }
    }

    /// Frequency ratio of the upper note to the base note.
    ///
    /// Just intonation uses the simple rational intervals (5/4, 3/2);
    /// equal temperament the corresponding powers of 2^(1/12).
    pub fn ratio(self, tuning: Tuning) -> f32 {
        match (self, tuning) {
            (Interval::MajorThird, Tuning::Ji) => 5.0 / 4.0,
            (Interval::MajorThird, Tuning::Tet) => 2f32.powf(4.0 / 12.0),
            (Interval::PerfectFifth, Tuning::Ji) => 3.0 / 2.0,
            (Interval::PerfectFifth, Tuning::Tet) => 2f32.powf(7.0 / 12.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tuning {
    #[serde(rename = "JI")]
    Ji,
    #[serde(rename = "TET")]
    Tet,
}

impl Tuning {
    pub fn label(self) -> &'static str {
        match self {
            Tuning::Ji => "JI",
            Tuning::Tet => "TET",
        }
    }

    pub fn complement(self) -> Self {
        match self {
            Tuning::Ji => Tuning::Tet,
            Tuning::Tet => Tuning::Ji,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: String,
    pub interval: Interval,
    pub waveform: Waveform,
}

/// Concrete stimulus: a waveform and the two frequencies of the dyad.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusVariant {
    pub key: String,
    pub waveform: Waveform,
    pub f0_hz: f32,
    pub f1_hz: f32,
}

/// Immutable lookup tables built once at startup. Lookups return `Option`;
/// a miss is recoverable (the session skips the trial rather than aborting).
#[derive(Debug, Clone)]
pub struct Catalog {
    conditions: Vec<Condition>,
    variants: HashMap<String, StimulusVariant>,
}

impl Catalog {
    /// Full 2 intervals x 3 waveforms catalog over the given base frequency.
    pub fn standard(base_freq_hz: f32) -> Self {
        let intervals = [Interval::MajorThird, Interval::PerfectFifth];
        let waveforms = [Waveform::Sine, Waveform::Triangle, Waveform::Sawtooth];
        let conditions = intervals
            .iter()
            .flat_map(|&interval| {
                waveforms.iter().map(move |&waveform| Condition {
                    id: format!("{}_{}", interval.label(), waveform.label()),
                    interval,
                    waveform,
                })
            })
            .collect();
        Self::custom(conditions, base_freq_hz)
    }

    /// Catalog over an arbitrary condition set (fixed stimulus orders, pilots).
    pub fn custom(conditions: Vec<Condition>, base_freq_hz: f32) -> Self {
        let mut variants = HashMap::new();
        for condition in &conditions {
            for tuning in [Tuning::Ji, Tuning::Tet] {
                let key = Self::variant_key(&condition.id, tuning);
                variants.insert(
                    key.clone(),
                    StimulusVariant {
                        key,
                        waveform: condition.waveform,
                        f0_hz: base_freq_hz,
                        f1_hz: base_freq_hz * condition.interval.ratio(tuning),
                    },
                );
            }
        }
        Self { conditions, variants }
    }

    pub fn variant_key(condition_id: &str, tuning: Tuning) -> String {
        format!("{}_{}", condition_id, tuning.label())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn condition(&self, id: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    pub fn variant(&self, condition_id: &str, tuning: Tuning) -> Option<&StimulusVariant> {
        self.variants.get(&Self::variant_key(condition_id, tuning))
    }

    pub fn variant_by_key(&self, key: &str) -> Option<&StimulusVariant> {
        self.variants.get(key)
    }
}
