use std::time::{Duration, Instant};

use sha1::{Digest, Sha1};
use tracing::{debug, trace};

use crate::browser::driver::Driver;
use crate::browser::protocol::{ElementState, Locator};

/// How a content-stabilization wait ended. The wait itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stabilization {
    /// Two consecutive fingerprints matched
    Stable { fingerprint: String, polls: u32 },
    /// The window elapsed while content was still changing
    Unsettled { polls: u32 },
    /// Content could not be fingerprinted; only the settle delay was spent
    FixedDelay,
}

#[derive(Debug, Clone, Copy)]
pub struct StabilizerConfig {
    /// Bound on waiting for the loading indicator to disappear
    pub spinner_timeout: Duration,
    /// Delay between fingerprint samples
    pub poll_interval: Duration,
    /// Bound on fingerprint polling
    pub window: Duration,
    /// Always spent after the spinner wait, before the first sample
    pub settle_delay: Duration,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            spinner_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            window: Duration::from_secs(3),
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Waits for page content to stop changing before it is read.
#[derive(Debug, Clone)]
pub struct ContentStabilizer {
    spinner: Locator,
    content: Locator,
    config: StabilizerConfig,
}

impl ContentStabilizer {
    pub fn new(spinner: Locator, content: Locator, config: StabilizerConfig) -> Self {
        Self {
            spinner,
            content,
            config,
        }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Best-effort: a spinner that never appeared is not an error.
    ///
    /// The settle delay is spent before sampling starts, so a grid that has
    /// not begun to re-render yet is never reported as `Stable`.
    pub fn wait(&self, driver: &mut dyn Driver) -> Stabilization {
        if let Err(e) =
            driver.wait_for(&self.spinner, ElementState::Hidden, self.config.spinner_timeout)
        {
            debug!("loading indicator wait ended: {}", e);
        }
        driver.pause(self.config.settle_delay);

        let Some(mut previous) = self.fingerprint(driver) else {
            return Stabilization::FixedDelay;
        };

        let started = Instant::now();
        let mut polls = 0;
        while started.elapsed() < self.config.window {
            driver.pause(self.config.poll_interval);
            polls += 1;

            let Some(current) = self.fingerprint(driver) else {
                return Stabilization::FixedDelay;
            };
            trace!(polls, fingerprint = %current, "content sample");

            if current == previous {
                return Stabilization::Stable {
                    fingerprint: current,
                    polls,
                };
            }
            previous = current;
        }

        debug!(polls, "content still changing after stabilization window");
        Stabilization::Unsettled { polls }
    }

    fn fingerprint(&self, driver: &mut dyn Driver) -> Option<String> {
        match driver.all_text(&self.content) {
            Ok(texts) => Some(content_fingerprint(&texts)),
            Err(e) => {
                debug!("content fingerprint unavailable: {}", e);
                None
            }
        }
    }
}

/// SHA-1 over the ordered texts, with the count folded in so that an empty
/// grid and a grid of blank titles differ.
pub fn content_fingerprint(texts: &[String]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(texts.len().to_le_bytes());
    for text in texts {
        hasher.update(text.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
