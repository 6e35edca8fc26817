// Runner: walks the users file line by line and pushes each id through
// fetch -> resolve -> download. Failures are logged and the run moves on;
// only an unreadable input stops it.

use crate::api::AvatarApi;
use crate::avatar;
use crate::config::Config;
use crate::error::{Error, Result};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank or not a numeric id; nothing was requested.
    Skipped,
    /// The user lookup failed; no download was attempted.
    FetchFailed,
    /// The avatar was written to this path.
    Saved(PathBuf),
    DownloadFailed,
}

impl LineOutcome {
    /// Lines that reached the download step are followed by the delay.
    pub fn pauses(&self) -> bool {
        matches!(self, LineOutcome::Saved(_) | LineOutcome::DownloadFailed)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub saved: usize,
    pub download_failed: usize,
    pub fetch_failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &LineOutcome) {
        match outcome {
            LineOutcome::Skipped => self.skipped += 1,
            LineOutcome::FetchFailed => self.fetch_failed += 1,
            LineOutcome::Saved(_) => self.saved += 1,
            LineOutcome::DownloadFailed => self.download_failed += 1,
        }
    }
}

/// Trim `line` and accept it only if it is a non-empty run of ASCII digits.
pub fn parse_user_id(line: &str) -> Result<&str> {
    let id = line.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedInput(id.to_string()));
    }
    Ok(id)
}

pub struct Runner<'a, A: AvatarApi> {
    api: A,
    config: &'a Config,
    pause: Box<dyn FnMut(Duration) + 'a>,
}

impl<'a, A: AvatarApi> Runner<'a, A> {
    pub fn new(api: A, config: &'a Config) -> Self {
        Runner {
            api,
            config,
            pause: Box::new(thread::sleep),
        }
    }

    /// Replace the sleep between users, e.g. to record it in tests.
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + 'a) -> Self {
        self.pause = Box::new(pause);
        self
    }

    /// Process every line of `input` in order.
    pub fn run(&mut self, input: impl BufRead) -> std::io::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for line in input.lines() {
            let outcome = self.process_line(&line?);
            summary.record(&outcome);
        }
        Ok(summary)
    }

    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let user_id = match parse_user_id(line) {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping: {e}");
                return LineOutcome::Skipped;
            }
        };

        // A failed lookup returns before the delay.
        let user = match self.api.fetch_user(user_id) {
            Ok(user) => user,
            Err(e) => {
                error!("{e}");
                return LineOutcome::FetchFailed;
            }
        };

        let target = avatar::resolve(&user, &self.config.cdn_base);
        let out_path = self
            .config
            .output_dir
            .join(avatar::output_file_name(&user, user_id, &target));

        info!(
            "Downloading {}#{} -> {}",
            user.username.as_deref().unwrap_or("user"),
            user.discriminator.as_deref().unwrap_or("0"),
            target.url
        );

        let outcome = match self.api.download(&target.url, &out_path) {
            Ok(_) => {
                info!("Saved: {}", out_path.display());
                LineOutcome::Saved(out_path)
            }
            Err(e) => {
                error!("{e}");
                LineOutcome::DownloadFailed
            }
        };

        if outcome.pauses() {
            (self.pause)(self.config.delay);
        }
        outcome
    }
}
