use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::tone::{render_dyad, StimulusParams};
use crate::catalog::{Catalog, Tuning};

/// Write every stimulus in the catalog as a mono 16-bit wav into `dir`, one
/// file per variant key (`M3_sine_JI.wav`, ...).
pub fn export_stimuli(catalog: &Catalog, params: &StimulusParams, dir: &str) -> hound::Result<()> {
    fs::create_dir_all(dir)?;
    let spec = WavSpec {
        channels: 1,
        sample_rate: params.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    for condition in catalog.conditions() {
        for tuning in [Tuning::Ji, Tuning::Tet] {
            let Some(variant) = catalog.variant(&condition.id, tuning) else {
                continue;
            };
            let samples = render_dyad(variant, params);
            let path = Path::new(dir).join(format!("{}.wav", variant.key));
            let mut writer = WavWriter::create(&path, spec)?;
            for &s in &samples {
                writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
            }
            writer.finalize()?;
            info!(path = %path.display(), "stimulus written");
        }
    }
    Ok(())
}
