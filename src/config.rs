use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_latency_ms")]
    pub latency_ms: f32,
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
}

impl AudioConfig {
    fn default_latency_ms() -> f32 {
        80.0
    }
    fn default_sample_rate() -> u32 {
        48_000
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            latency_ms: Self::default_latency_ms(),
            sample_rate: Self::default_sample_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StimulusConfig {
    #[serde(default = "StimulusConfig::default_base_freq_hz")]
    pub base_freq_hz: f32,
    #[serde(default = "StimulusConfig::default_tone_duration_ms")]
    pub tone_duration_ms: f32,
    #[serde(default = "StimulusConfig::default_fade_ms")]
    pub fade_ms: f32,
    #[serde(default = "StimulusConfig::default_amplitude")]
    pub amplitude: f32,
}

impl StimulusConfig {
    fn default_base_freq_hz() -> f32 {
        440.0
    }
    fn default_tone_duration_ms() -> f32 {
        1_200.0
    }
    fn default_fade_ms() -> f32 {
        100.0
    }
    fn default_amplitude() -> f32 {
        0.4
    }
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            base_freq_hz: Self::default_base_freq_hz(),
            tone_duration_ms: Self::default_tone_duration_ms(),
            fade_ms: Self::default_fade_ms(),
            amplitude: Self::default_amplitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialsConfig {
    #[serde(default = "TrialsConfig::default_repetitions")]
    pub repetitions: usize,
    #[serde(default = "TrialsConfig::default_inter_trial_delay_ms")]
    pub inter_trial_delay_ms: u64,
}

impl TrialsConfig {
    fn default_repetitions() -> usize {
        3
    }
    fn default_inter_trial_delay_ms() -> u64 {
        500
    }
}

impl Default for TrialsConfig {
    fn default() -> Self {
        Self {
            repetitions: Self::default_repetitions(),
            inter_trial_delay_ms: Self::default_inter_trial_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Form-collection endpoint; results stay local when unset.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "SubmissionConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SubmissionConfig {
    fn default_timeout_ms() -> u64 {
        10_000
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub stimulus: StimulusConfig,
    #[serde(default)]
    pub trials: TrialsConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

impl AppConfig {
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("failed to parse config {path}: {err}; using defaults");
                    }
                },
                Err(err) => {
                    warn!("failed to read config {path}: {err}; using defaults");
                }
            }
            return Self::default();
        }

        // File does not exist: write commented defaults and return them.
        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                let mut commented = String::new();
                for line in text.lines() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        commented.push('\n');
                    } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                        commented.push_str(line);
                        commented.push('\n');
                    } else {
                        commented.push_str("# ");
                        commented.push_str(line);
                        commented.push('\n');
                    }
                }
                if let Err(err) = fs::write(path_obj, commented) {
                    warn!("failed to write default config to {path}: {err}");
                }
            }
            Err(err) => {
                warn!("failed to serialize default config: {err}; continuing with defaults");
            }
        }
        default_cfg
    }
}
