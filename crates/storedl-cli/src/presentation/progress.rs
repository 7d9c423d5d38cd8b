//! Terminal progress rendering for jobs.
//!
//! Uses an indicatif bar on a terminal and throttled plain lines otherwise.

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use storedl_core::{DownloadMode, ProgressEvent};

/// Progress display that automatically selects terminal or plain output.
pub struct JobProgressPrinter {
    inner: ProgressRender,
}

enum ProgressRender {
    Fancy(FancyProgress),
    Plain(PlainProgress),
}

impl JobProgressPrinter {
    pub fn new(mode: DownloadMode) -> Self {
        let inner = if io::stdout().is_terminal() {
            ProgressRender::Fancy(FancyProgress::new(mode))
        } else {
            ProgressRender::Plain(PlainProgress::new(mode))
        };
        Self { inner }
    }

    pub fn update(&mut self, event: &ProgressEvent) {
        match &mut self.inner {
            ProgressRender::Fancy(inner) => inner.update(event),
            ProgressRender::Plain(inner) => inner.update(event),
        }
    }

    /// Finish and clear the progress display.
    pub fn finish(&mut self) {
        match &mut self.inner {
            ProgressRender::Fancy(inner) => inner.finish(),
            ProgressRender::Plain(inner) => inner.finish(),
        }
    }
}

const fn verb(mode: DownloadMode) -> &'static str {
    match mode {
        DownloadMode::Download => "Downloading",
        DownloadMode::Verify => "Verifying",
    }
}

// ============================================================================
// Fancy Terminal Progress (indicatif)
// ============================================================================

struct FancyProgress {
    bar: ProgressBar,
    mode: DownloadMode,
    saw_length: bool,
}

impl FancyProgress {
    fn new(mode: DownloadMode) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        if let Ok(style) = ProgressStyle::with_template("{msg} {spinner}") {
            bar.set_style(style);
        }
        bar.set_message(format!("{}: waiting for session", verb(mode)));
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            mode,
            saw_length: false,
        }
    }

    fn update(&mut self, event: &ProgressEvent) {
        if !self.saw_length {
            if let Ok(style) = ProgressStyle::with_template(
                "{msg} {bar:28.cyan/blue} {bytes:>9} / {total_bytes:>9} ({percent:>3}%) @ {binary_bytes_per_sec} ETA {eta}",
            ) {
                self.bar.set_style(style);
            }
            self.bar
                .set_message(format!("{} {}", verb(self.mode), event.version));
            self.saw_length = true;
        }
        if self.bar.length() != Some(event.total) {
            self.bar.set_length(event.total);
        }
        self.bar.set_position(event.current.min(event.total));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

// ============================================================================
// Plain Progress (non-terminal)
// ============================================================================

struct PlainProgress {
    mode: DownloadMode,
    last_emit: Option<Instant>,
    printed: bool,
}

impl PlainProgress {
    const fn new(mode: DownloadMode) -> Self {
        Self {
            mode,
            last_emit: None,
            printed: false,
        }
    }

    fn update(&mut self, event: &ProgressEvent) {
        const MIN_INTERVAL: Duration = Duration::from_millis(500);
        let now = Instant::now();
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= MIN_INTERVAL);
        if event.current < event.total && !due {
            return;
        }
        self.last_emit = Some(now);
        self.printed = true;

        let line = plain_line(self.mode, event);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }

    fn finish(&mut self) {
        if self.printed {
            let _ = io::stdout().flush();
        }
    }
}

fn plain_line(mode: DownloadMode, event: &ProgressEvent) -> String {
    let percent = event
        .percentage()
        .map_or_else(|| "--".to_string(), |p| format!("{p:5.1}%"));
    format!(
        "{} {}: {} / {} ({percent})",
        verb(mode),
        event.version,
        HumanBytes(event.current),
        HumanBytes(event.total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storedl_core::BuildVersion;

    #[test]
    fn plain_line_shows_bytes_and_percent() {
        let event = ProgressEvent::new(512, 1024, BuildVersion::parse("1.29.1").unwrap());
        let line = plain_line(DownloadMode::Download, &event);
        assert!(line.starts_with("Downloading 1.29.1"));
        assert!(line.contains(" 50.0%"));
    }

    #[test]
    fn plain_line_without_total() {
        let event = ProgressEvent::new(0, 0, BuildVersion::parse("1.29.1").unwrap());
        assert!(plain_line(DownloadMode::Verify, &event).ends_with("(--)"));
    }
}
