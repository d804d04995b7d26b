//! Pairwise tuning-preference experiment: just-intonation vs. equal-temperament
//! dyads across interval and waveform conditions, judged trial by trial.

pub mod app;
pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod plan;
pub mod questionnaire;
pub mod session;
pub mod submit;
