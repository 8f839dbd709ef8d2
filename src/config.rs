use std::path::PathBuf;

use clap::Parser;

/// Default game length: five minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 5 * 60;

#[derive(Parser, Debug, Clone)]
#[command(name = "word_invaders")]
#[command(about = "Shoot the English translation of the falling Chinese prompt")]
pub struct Args {
    /// Asset directory (defaults to ~/Desktop/space_invader_asset)
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Play without loading the asset directory (no sound)
    #[arg(long, conflicts_with = "assets")]
    pub skip_assets: bool,

    /// JSON word list: [{"chinese": "..", "english": ".."}, ...]
    #[arg(long, value_name = "JSON")]
    pub words: Option<PathBuf>,

    /// Seed for a reproducible game
    #[arg(long)]
    pub seed: Option<u64>,

    /// Length of a game in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub time_limit: u64,

    /// Silence all sound cues
    #[arg(long)]
    pub mute: bool,

    /// Write logs here (the terminal is busy with the game)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
