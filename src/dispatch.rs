//! Dispatch sinks: desktop notifications and speech
//!
//! Both sinks are fire-and-forget. Failures are logged and the message is
//! echoed to the log so nothing is lost, but nothing ever propagates back
//! into the pipeline.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Send a desktop notification with the given title and body.
///
/// Uses notify-send (libnotify). Failures are logged with the message as
/// console fallback.
pub async fn notify(title: &str, body: &str) {
    let result = Command::new("notify-send")
        .args(["--app-name=DocuMental", "--expire-time=10000", title, body])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match result {
        Ok(status) if status.success() => {
            tracing::debug!("Desktop notification sent: {:?}", title);
        }
        Ok(status) => {
            tracing::warn!("notify-send exited with {}; {}: {}", status, title, body);
        }
        Err(e) => {
            tracing::warn!("Could not send notification ({}); {}: {}", e, title, body);
        }
    }
}

/// Optional speech synthesis capability, resolved once at startup.
///
/// Probes for speech-dispatcher's `spd-say` first, then `espeak`. Absence
/// degrades to a no-op, never a crash.
#[derive(Debug, Clone)]
pub struct Speech {
    program: PathBuf,
}

impl Speech {
    /// Locate a speech synthesizer on this system, if any
    pub fn resolve() -> Option<Speech> {
        for candidate in ["spd-say", "espeak"] {
            if let Ok(program) = which::which(candidate) {
                tracing::info!("Speech synthesizer: {:?}", program);
                return Some(Speech { program });
            }
        }
        tracing::info!("No speech synthesizer found (spd-say/espeak), speech disabled");
        None
    }

    /// Speak the message aloud. Waits for completion so consecutive
    /// messages don't talk over each other.
    pub async fn speak(&self, message: &str) {
        let result = Command::new(&self.program)
            .arg(message)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(e) = result {
            tracing::warn!("Speech synthesis failed: {}", e);
        }
    }
}
