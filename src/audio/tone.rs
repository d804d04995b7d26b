//! Render a stimulus variant into a mono sample buffer: two equal-amplitude
//! partials (base note and tuned upper note) with linear fade ramps at both
//! edges so starts and stops never click.

use crate::catalog::{StimulusVariant, Waveform};
use crate::config::{AudioConfig, StimulusConfig};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy)]
pub struct StimulusParams {
    pub sample_rate: u32,
    pub duration_ms: f32,
    pub fade_ms: f32,
    pub amplitude: f32,
}

impl StimulusParams {
    pub fn from_config(audio: &AudioConfig, stimulus: &StimulusConfig) -> Self {
        Self {
            sample_rate: audio.sample_rate,
            duration_ms: stimulus.tone_duration_ms,
            fade_ms: stimulus.fade_ms,
            amplitude: stimulus.amplitude,
        }
    }
}

pub fn render_dyad(variant: &StimulusVariant, params: &StimulusParams) -> Vec<f32> {
    let fs = params.sample_rate as f32;
    let n = (fs * params.duration_ms / 1000.0).round() as usize;
    let fade = ((fs * params.fade_ms / 1000.0).round() as usize).min(n / 2);

    let step0 = variant.f0_hz / fs;
    let step1 = variant.f1_hz / fs;
    let mut phase0 = 0.0f32;
    let mut phase1 = 0.0f32;

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let s = 0.5 * (osc(variant.waveform, phase0) + osc(variant.waveform, phase1));
        out.push(s * params.amplitude * fade_gain(i, n, fade));
        phase0 = (phase0 + step0).fract();
        phase1 = (phase1 + step1).fract();
    }
    out
}

/// One oscillator sample for normalized phase in [0, 1).
fn osc(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Triangle => {
            if phase < 0.5 {
                4.0 * phase - 1.0
            } else {
                3.0 - 4.0 * phase
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

fn fade_gain(i: usize, n: usize, fade: usize) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    if i < fade {
        return i as f32 / fade as f32;
    }
    let remaining = n - 1 - i;
    if remaining < fade {
        remaining as f32 / fade as f32
    } else {
        1.0
    }
}
