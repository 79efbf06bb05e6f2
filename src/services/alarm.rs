//! Alarm sound playback
//!
//! The alarm is played by an external audio player process. The playback
//! handle is owned here: it is acquired when the countdown starts alarming and
//! released when the alarm is stopped. Failures are reported to the caller as
//! plain messages and never block the countdown state machine.

use std::{
    path::PathBuf,
    process::Stdio,
    sync::Mutex,
};
use tokio::{
    process::{Child, Command},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Collaborator that plays and halts the alarm sound
pub trait AlarmSink: Send + Sync {
    /// Start playing the alarm from the beginning of the recording
    fn play(&self) -> Result<(), String>;

    /// Stop playback. Halting when nothing is playing is a no-op.
    fn halt(&self);
}

/// How the alarm sound is played
#[derive(Debug, Clone)]
pub struct AlarmConfig {
    /// Path to the alarm recording
    pub sound_path: PathBuf,
    /// Player program, e.g. `mpg123`
    pub player: String,
    /// Arguments passed before the sound path
    pub player_args: Vec<String>,
    /// Replay the recording until halted
    pub repeat: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            sound_path: PathBuf::from("alarm_sound.mp3"),
            player: "mpg123".to_string(),
            player_args: vec!["-q".to_string()],
            repeat: false,
        }
    }
}

/// Plays the alarm with an external player process
#[derive(Debug)]
pub struct AlarmPlayer {
    config: AlarmConfig,
    playback: Mutex<Option<JoinHandle<()>>>,
}

impl AlarmPlayer {
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            config,
            playback: Mutex::new(None),
        }
    }

    /// Whether a playback handle is currently held
    pub fn is_playing(&self) -> bool {
        self.playback
            .lock()
            .map(|playback| playback.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl AlarmSink for AlarmPlayer {
    fn play(&self) -> Result<(), String> {
        if !self.config.sound_path.is_file() {
            return Err(format!(
                "alarm sound not found: {}",
                self.config.sound_path.display()
            ));
        }

        let mut playback = self.playback.lock()
            .map_err(|e| format!("Failed to lock alarm playback: {}", e))?;

        let child = spawn_player(&self.config)?;
        let task = tokio::spawn(playback_task(self.config.clone(), child));
        if let Some(previous) = playback.replace(task) {
            previous.abort();
        }

        info!("Alarm playback started: {}", self.config.sound_path.display());
        Ok(())
    }

    fn halt(&self) {
        let task = match self.playback.lock() {
            Ok(mut playback) => playback.take(),
            Err(e) => {
                warn!("Failed to lock alarm playback: {}", e);
                return;
            }
        };

        match task {
            Some(task) => {
                // Dropping the aborted task drops the child, which kills it
                task.abort();
                info!("Alarm playback halted");
            }
            None => debug!("No alarm playback to halt"),
        }
    }
}

impl Drop for AlarmPlayer {
    fn drop(&mut self) {
        if let Ok(playback) = self.playback.get_mut() {
            if let Some(task) = playback.take() {
                task.abort();
            }
        }
    }
}

/// Spawn one run of the player process
fn spawn_player(config: &AlarmConfig) -> Result<Child, String> {
    debug!("Spawning alarm player: {} {:?}", config.player, config.player_args);

    Command::new(&config.player)
        .args(&config.player_args)
        .arg(&config.sound_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to spawn alarm player '{}': {}", config.player, e))
}

/// Wait for the player, replaying the recording when `repeat` is set
async fn playback_task(config: AlarmConfig, mut child: Child) {
    loop {
        match child.wait().await {
            Ok(status) => debug!("Alarm player exited: {}", status),
            Err(e) => {
                warn!("Failed to wait for alarm player: {}", e);
                return;
            }
        }

        if !config.repeat {
            return;
        }

        child = match spawn_player(&config) {
            Ok(child) => child,
            Err(e) => {
                warn!("Alarm replay failed: {}", e);
                return;
            }
        };
    }
}

/// Check that the configured player can be executed
pub async fn check_player_available(player: &str) -> Result<(), String> {
    Command::new(player)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("Alarm player '{}' is not available: {}", player, e))?;

    info!("Alarm player {} is available", player);
    Ok(())
}
