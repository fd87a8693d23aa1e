//! Terminal presentation: startup stage timers and the live status line.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

use crate::annotate::Overlay;
use crate::pipeline::FrameOutcome;
use crate::zone::SafetyState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
    disable_pretty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool, disable_pretty: bool) -> Self {
        Self {
            mode,
            is_tty,
            disable_pretty,
        }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool, disable_pretty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty, disable_pretty)
    }

    pub fn is_pretty(&self) -> bool {
        self.is_tty
            && match self.mode {
                UiMode::Pretty => true,
                UiMode::Auto => !self.disable_pretty,
                UiMode::Plain => false,
            }
    }

    pub fn stage(&self, name: &str) -> StageGuard {
        if self.is_pretty() {
            let spinner = spinner();
            spinner.set_message(format!("{name}…"));
            StageGuard::new(name.to_string(), Some(spinner))
        } else {
            eprintln!("==> {}", name);
            StageGuard::new(name.to_string(), None)
        }
    }

    /// Live readout of the monitor state.
    pub fn status_line(&self) -> StatusLine {
        StatusLine {
            spinner: self.is_pretty().then(spinner),
            last_state: None,
        }
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner
}

pub struct StageGuard {
    name: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl StageGuard {
    fn new(name: String, spinner: Option<ProgressBar>) -> Self {
        Self {
            name,
            start: Instant::now(),
            spinner,
        }
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let message = format!("✔ {} ({})", self.name, format_duration(elapsed));
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message);
        } else {
            eprintln!("{message}");
        }
    }
}

/// Shows the overlay's text on the terminal.
///
/// With a spinner every frame refreshes the message; without one only state
/// transitions are logged.
pub struct StatusLine {
    spinner: Option<ProgressBar>,
    last_state: Option<SafetyState>,
}

impl StatusLine {
    /// Returns true when the state differs from the previous frame's.
    pub fn update(&mut self, outcome: &FrameOutcome, overlay: &Overlay) -> bool {
        let changed = self.last_state != Some(outcome.state);
        self.last_state = Some(outcome.state);

        let text = status_text(outcome, overlay);
        if let Some(spinner) = &self.spinner {
            spinner.set_message(text);
        } else if changed {
            log::info!("frame {}: {}", outcome.seq, text);
        }
        changed
    }

    pub fn finish(self) {
        if let Some(spinner) = self.spinner {
            let state = self.last_state.unwrap_or_default();
            spinner.finish_with_message(format!("stopped in state {}", state));
        }
    }
}

fn status_text(outcome: &FrameOutcome, overlay: &Overlay) -> String {
    let mut parts: Vec<String> = overlay.texts().map(str::to_string).collect();
    match (outcome.point, outcome.distance) {
        (Some(point), Some(distance)) => {
            parts.push(format!("at ({}, {}) {:.1}px from zone", point.x, point.y, distance))
        }
        _ => parts.push("no object".to_string()),
    }
    parts.join(" | ")
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
