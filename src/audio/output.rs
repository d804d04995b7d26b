use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use ringbuf::traits::*;
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, error};

use super::AudioError;

/// Connection to the default output device. Mono samples pushed into the ring
/// buffer are duplicated across the device's channels in the callback; an
/// empty buffer plays silence. Capacity is sized from `latency_ms` so an
/// interrupting fade takes effect quickly.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    pub sample_rate: u32,
}

impl AudioOutput {
    pub fn new(latency_ms: f32) -> Result<(Self, HeapProd<f32>), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        let config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = ((sample_rate as f32 * latency_ms / 1000.0) as usize).max(256);
        let rb = HeapRb::<f32>::new(capacity);
        let (prod, mut cons): (HeapProd<f32>, HeapCons<f32>) = rb.split();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let n_frames = data.len() / channels;
                for frame in 0..n_frames {
                    let s = cons.try_pop().unwrap_or(0.0);
                    for ch in 0..channels {
                        data[frame * channels + ch] = s;
                    }
                }
            },
            |err| error!("output stream error: {err}"),
            None,
        )?;
        stream.play()?;
        debug!(sample_rate, channels, capacity, "audio output running");

        Ok((
            Self {
                stream: Some(stream),
                sample_rate,
            },
            prod,
        ))
    }

    /// Push samples, waiting for the device to drain when the buffer is full.
    pub fn push_samples(prod: &mut HeapProd<f32>, samples: &[f32]) {
        let mut offset = 0;
        while offset < samples.len() {
            offset += prod.push_slice(&samples[offset..]);
            if offset < samples.len() {
                std::thread::sleep(std::time::Duration::from_micros(500));
            }
        }
    }

    pub fn stop(&mut self) {
        self.stream.take(); // take and Drop
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stream.take();
    }
}
