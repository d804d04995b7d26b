//! Line-oriented experiment runner: wires the session core to the terminal,
//! the audio player and the submission endpoint.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{info, warn};

use crate::audio::player::Player;
use crate::audio::tone::{render_dyad, StimulusParams};
use crate::audio::writer::export_stimuli;
use crate::catalog::Catalog;
use crate::cli::Args;
use crate::config::AppConfig;
use crate::ledger::{ParticipantId, Side};
use crate::questionnaire::{self, QuestionnaireData};
use crate::session::{ExperimentSession, Phase, SessionError};
use crate::submit::{render_fallback, HttpSubmitter, SubmissionPayload, Submitter};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("wav export failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("encoding results failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn run(args: Args, stop_flag: Arc<AtomicBool>) -> Result<(), AppError> {
    let cfg = AppConfig::load_or_default(&args.config);
    let params = StimulusParams::from_config(&cfg.audio, &cfg.stimulus);
    let catalog = Catalog::standard(cfg.stimulus.base_freq_hz);

    if let Some(dir) = &args.wav {
        export_stimuli(&catalog, &params, dir)?;
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let participant = match &args.participant {
        Some(raw) => ParticipantId::from_raw(raw.clone()),
        None => ParticipantId::generate(&mut rng),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let questionnaire_data: Option<QuestionnaireData> = if args.skip_questionnaire {
        None
    } else {
        writeln!(output, "Before we start, a few quick questions.")?;
        Some(questionnaire::collect(&mut input, &mut output)?)
    };

    let player = if args.play {
        match Player::start(cfg.audio.latency_ms, cfg.stimulus.fade_ms) {
            Ok(player) => player,
            Err(err) => {
                warn!("audio unavailable ({err}); continuing silent");
                Player::disabled()
            }
        }
    } else {
        Player::disabled()
    };

    let mut session =
        ExperimentSession::new(catalog, cfg.trials.repetitions, participant.clone(), rng);
    session.start();

    writeln!(
        output,
        "\n{} trials. In each one, listen to sides A and B and pick the one you prefer.",
        session.total_trials()
    )?;
    writeln!(
        output,
        "Commands: a / b = play a side, 1 / 2 = select side A / B, ok = confirm."
    )?;

    let mut selected: Option<Side> = None;
    let mut announced: Option<usize> = None;
    let delay = Duration::from_millis(cfg.trials.inter_trial_delay_ms);

    loop {
        if stop_flag.load(Ordering::SeqCst) {
            warn!("interrupted; dumping partial results");
            dump_partial(&mut output, &session, &participant, questionnaire_data.as_ref())?;
            return Ok(());
        }

        let index = match session.phase() {
            Phase::Completed => break,
            Phase::NotStarted => break,
            Phase::AwaitingJudgment(index) => index,
        };

        if announced != Some(index) {
            announced = Some(index);
            selected = None;
            writeln!(output, "\nTrial {} of {}", index + 1, session.total_trials())?;
        }
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // stdin closed mid-run; keep whatever was recorded
            warn!("input closed before completion; dumping partial results");
            dump_partial(&mut output, &session, &participant, questionnaire_data.as_ref())?;
            return Ok(());
        }

        match line.trim() {
            "a" | "A" => play_side(&player, &session, Side::A, &params),
            "b" | "B" => play_side(&player, &session, Side::B, &params),
            "1" => {
                selected = Some(Side::A);
                writeln!(output, "Side A selected. Type 'ok' to confirm.")?;
            }
            "2" => {
                selected = Some(Side::B);
                writeln!(output, "Side B selected. Type 'ok' to confirm.")?;
            }
            "ok" => match session.record_judgment(selected) {
                Ok(_) => {
                    player.stop();
                    selected = None;
                    writeln!(output, "Recorded.")?;
                    if session.phase() != Phase::Completed && !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
                Err(SessionError::NoSelection) => {
                    writeln!(output, "Nothing selected yet; press 1 or 2 first.")?;
                }
                Err(err) => warn!("judgment rejected: {err}"),
            },
            "" => {}
            other => {
                writeln!(output, "Unknown command '{other}'. Use a, b, 1, 2 or ok.")?;
            }
        }
    }

    player.stop();
    drop(player);

    let payload = SubmissionPayload {
        participant_id: participant.as_str(),
        experiment_data: session.ledger().all(),
        questionnaire: questionnaire_data.as_ref(),
    };

    if let Some(path) = &args.results {
        std::fs::write(path, serde_json::to_string_pretty(&payload)?)?;
        info!(path = %path, "results written");
    }

    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| cfg.submission.endpoint_url.clone());
    match endpoint {
        Some(url) => {
            let submitter = HttpSubmitter::new(url, Duration::from_millis(cfg.submission.timeout_ms));
            match submitter.submit(&payload) {
                Ok(()) => {
                    writeln!(output, "\nAll done. Results submitted, thank you!")?;
                }
                Err(err) => {
                    warn!("submission failed: {err}");
                    writeln!(
                        output,
                        "\nSubmission failed ({err}). Please copy the JSON below and send it to the experimenter:"
                    )?;
                    writeln!(output, "{}", render_fallback(&payload)?)?;
                }
            }
        }
        None => {
            writeln!(output, "\nAll done. No endpoint configured; results below:")?;
            writeln!(output, "{}", render_fallback(&payload)?)?;
        }
    }

    Ok(())
}

fn play_side(
    player: &Player,
    session: &ExperimentSession<StdRng>,
    side: Side,
    params: &StimulusParams,
) {
    let Some(assignment) = session.current() else {
        return;
    };
    let key = assignment.key_for(side);
    match session.catalog().variant_by_key(key) {
        Some(variant) => {
            let samples = render_dyad(variant, params);
            player.play(side, samples.into());
        }
        None => warn!(key, "stimulus missing from catalog; cannot play"),
    }
}

fn dump_partial<W: Write>(
    output: &mut W,
    session: &ExperimentSession<StdRng>,
    participant: &ParticipantId,
    questionnaire: Option<&QuestionnaireData>,
) -> Result<(), AppError> {
    let payload = SubmissionPayload {
        participant_id: participant.as_str(),
        experiment_data: session.ledger().all(),
        questionnaire,
    };
    writeln!(output, "\nPartial results ({} trials):", session.ledger().len())?;
    writeln!(output, "{}", render_fallback(&payload)?)?;
    Ok(())
}
