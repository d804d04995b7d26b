//! Exclusive playback worker. At most one side is audible at a time: starting
//! the other side, or stopping, fades the current buffer out over the fade
//! window instead of cutting it dead.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use ringbuf::HeapProd;
use tracing::{debug, warn};

use super::output::AudioOutput;
use super::AudioError;
use crate::ledger::Side;

const CHUNK: usize = 512;

enum PlayerCmd {
    Play(Side, Arc<[f32]>),
    Stop,
}

pub struct Player {
    tx: Option<Sender<PlayerCmd>>,
    handle: Option<thread::JoinHandle<()>>,
    _output: Option<AudioOutput>,
}

impl Player {
    pub fn start(latency_ms: f32, fade_ms: f32) -> Result<Self, AudioError> {
        let (output, prod) = AudioOutput::new(latency_ms)?;
        let sample_rate = output.sample_rate;
        let (tx, rx) = bounded::<PlayerCmd>(8);
        let handle = thread::Builder::new()
            .name("player".into())
            .spawn(move || player_loop(rx, prod, sample_rate, fade_ms))
            .expect("spawn player thread");
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            _output: Some(output),
        })
    }

    /// Player that swallows every command; used with `--play=false` and when
    /// the output device cannot be opened.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            handle: None,
            _output: None,
        }
    }

    pub fn play(&self, side: Side, samples: Arc<[f32]>) {
        if let Some(tx) = &self.tx {
            if tx.send(PlayerCmd::Play(side, samples)).is_err() {
                warn!("player thread gone; dropping play command");
            }
        }
    }

    pub fn stop(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(PlayerCmd::Stop);
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.tx.take(); // closing the channel ends the worker loop
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn player_loop(rx: Receiver<PlayerCmd>, mut prod: HeapProd<f32>, sample_rate: u32, fade_ms: f32) {
    let fade_len = ((sample_rate as f32 * fade_ms / 1000.0) as usize).max(1);
    let mut current: Option<(Side, Arc<[f32]>, usize)> = None;
    let mut pending: Option<(Side, Arc<[f32]>)> = None;
    let mut fade_remaining: Option<usize> = None;
    let mut chunk = [0.0f32; CHUNK];

    loop {
        // Block when idle, otherwise just drain whatever has arrived.
        let cmd = if current.is_none() && pending.is_none() {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => return,
            }
        } else {
            match rx.try_recv() {
                Ok(cmd) => Some(cmd),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            }
        };

        if let Some(cmd) = cmd {
            match cmd {
                PlayerCmd::Play(side, samples) => {
                    if let Some((cur_side, _, _)) = &current {
                        debug!(from = ?cur_side, to = ?side, "fading out for new side");
                        fade_remaining = Some(fade_len);
                        pending = Some((side, samples));
                    } else {
                        current = Some((side, samples, 0));
                        fade_remaining = None;
                    }
                }
                PlayerCmd::Stop => {
                    if current.is_some() {
                        fade_remaining = Some(fade_len);
                    }
                    pending = None;
                }
            }
        }

        // Promote a pending buffer once the old one has faded out or ended.
        if current.is_none() {
            if let Some((side, samples)) = pending.take() {
                current = Some((side, samples, 0));
                fade_remaining = None;
            } else {
                continue;
            }
        }

        let Some((_, samples, pos)) = current.as_mut() else {
            continue;
        };
        let end = (*pos + CHUNK).min(samples.len());
        let len = end - *pos;
        chunk[..len].copy_from_slice(&samples[*pos..end]);
        if let Some(remaining) = fade_remaining.as_mut() {
            for (i, s) in chunk[..len].iter_mut().enumerate() {
                let left = remaining.saturating_sub(i);
                *s *= left as f32 / fade_len as f32;
            }
            *remaining = remaining.saturating_sub(len);
        }
        AudioOutput::push_samples(&mut prod, &chunk[..len]);
        *pos = end;

        if *pos >= samples.len() || fade_remaining == Some(0) {
            current = None;
            fade_remaining = None;
        }
    }
}
