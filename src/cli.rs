use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Play audio in realtime
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub play: bool,

    /// Export the full stimulus set as wav files into this directory and exit
    #[arg(long)]
    pub wav: Option<String>,

    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Seed for trial ordering and counterbalancing (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Participant identifier (generated if omitted)
    #[arg(long)]
    pub participant: Option<String>,

    /// Skip the pre-experiment questionnaire
    #[arg(long, default_value_t = false)]
    pub skip_questionnaire: bool,

    /// Write the final submission payload to this JSON file
    #[arg(long)]
    pub results: Option<String>,

    /// Override the submission endpoint from the config
    #[arg(long)]
    pub endpoint: Option<String>,
}
