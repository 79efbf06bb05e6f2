//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::services::AlarmConfig;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-alarm")]
#[command(about = "A single-timer countdown service with a live clock and an alarm sound")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Alarm sound file
    #[arg(short, long, default_value = "alarm_sound.mp3")]
    pub sound: PathBuf,

    /// Audio player program used to play the alarm
    #[arg(long, default_value = "mpg123")]
    pub player: String,

    /// Argument passed to the player before the sound file (repeatable)
    #[arg(long = "player-arg", default_values_t = vec!["-q".to_string()], allow_hyphen_values = true)]
    pub player_args: Vec<String>,

    /// Replay the alarm until it is stopped instead of playing it once
    #[arg(long)]
    pub loop_alarm: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Alarm playback settings
    pub fn alarm_config(&self) -> AlarmConfig {
        AlarmConfig {
            sound_path: self.sound.clone(),
            player: self.player.clone(),
            player_args: self.player_args.clone(),
            repeat: self.loop_alarm,
        }
    }
}
