use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde_json::Value;

use discover_e2e::browser::driver::Driver;
use discover_e2e::browser::protocol::{ElementState, Locator, WaitUntil};
use discover_e2e::error::{SuiteError, SuiteResult};

/// Every call the page object made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Navigate(String, WaitUntil),
    WaitFor(Locator, ElementState),
    Click(Locator),
    Fill(Locator, String),
    Press(Locator, String),
    Hover(Locator),
    IsVisible(Locator),
    Count(Locator),
    AllText(Locator),
    Screenshot(bool),
    Evaluate(String),
    Pause(Duration),
    Close,
}

/// Scripted in-memory session.
///
/// Locators registered with `timeout_on` fail every wait or interaction with
/// `LocatorTimeout`; `broken_on` fails them with a protocol error instead.
/// Everything else succeeds immediately.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub calls: Vec<Call>,
    timeouts: Vec<Locator>,
    broken: Vec<Locator>,
    visible: Vec<Locator>,
    counts: Vec<(Locator, usize)>,
    texts: Vec<(Locator, Vec<String>)>,
    delayed_texts: Vec<(Locator, Instant, Vec<String>)>,
    click_texts: Vec<(Locator, Locator, Vec<String>)>,
    changing_text: bool,
    real_pauses: bool,
    text_reads: usize,
    navigation_fails: bool,
    screenshot_fails: bool,
    closed: bool,
    closes: Option<Arc<AtomicUsize>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout_on(mut self, locator: Locator) -> Self {
        self.timeouts.push(locator);
        self
    }

    pub fn broken_on(mut self, locator: Locator) -> Self {
        self.broken.push(locator);
        self
    }

    pub fn visible(mut self, locator: Locator) -> Self {
        self.visible.push(locator);
        self
    }

    pub fn with_count(mut self, locator: Locator, count: usize) -> Self {
        self.counts.push((locator, count));
        self
    }

    pub fn with_texts(mut self, locator: Locator, texts: &[&str]) -> Self {
        self.texts
            .push((locator, texts.iter().map(|t| t.to_string()).collect()));
        self
    }

    /// `locator` reads `texts` once `delay` has passed since this call.
    pub fn texts_after(mut self, locator: Locator, delay: Duration, texts: &[&str]) -> Self {
        self.delayed_texts.push((
            locator,
            Instant::now() + delay,
            texts.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    /// A successful click on `control` makes `locator` read `texts`.
    pub fn texts_on_click(mut self, control: Locator, locator: Locator, texts: &[&str]) -> Self {
        self.click_texts.push((
            control,
            locator,
            texts.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    /// Every text read returns something new.
    pub fn changing_text(mut self) -> Self {
        self.changing_text = true;
        self
    }

    /// `pause` actually sleeps, for tests that depend on wall-clock windows.
    pub fn real_pauses(mut self) -> Self {
        self.real_pauses = true;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.navigation_fails = true;
        self
    }

    pub fn failing_screenshot(mut self) -> Self {
        self.screenshot_fails = true;
        self
    }

    pub fn already_closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn count_closes(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.closes = Some(counter);
        self
    }

    pub fn clicked(&self, locator: &Locator) -> bool {
        self.calls.contains(&Call::Click(locator.clone()))
    }

    pub fn click_count(&self, locator: &Locator) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == Call::Click(locator.clone()))
            .count()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Pause(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn check(&self, locator: &Locator, timeout: Duration) -> SuiteResult<()> {
        if self.timeouts.contains(locator) {
            return Err(SuiteError::LocatorTimeout {
                locator: locator.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        if self.broken.contains(locator) {
            return Err(SuiteError::SessionProtocol {
                command: "fake".into(),
                error: format!("target closed while resolving {}", locator),
            });
        }
        Ok(())
    }
}

impl Driver for FakeDriver {
    fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> SuiteResult<()> {
        self.calls.push(Call::Navigate(url.to_string(), wait_until));
        if self.navigation_fails {
            return Err(SuiteError::NavigationFailure {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        Ok(())
    }

    fn wait_for(
        &mut self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> SuiteResult<()> {
        self.calls.push(Call::WaitFor(locator.clone(), state));
        self.check(locator, timeout)
    }

    fn click(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()> {
        self.calls.push(Call::Click(locator.clone()));
        self.check(locator, timeout)?;
        let switched: Vec<(Locator, Vec<String>)> = self
            .click_texts
            .iter()
            .filter(|(control, _, _)| control == locator)
            .map(|(_, target, texts)| (target.clone(), texts.clone()))
            .collect();
        for (target, texts) in switched {
            self.texts.retain(|(l, _)| *l != target);
            self.texts.push((target, texts));
        }
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str, timeout: Duration) -> SuiteResult<()> {
        self.calls.push(Call::Fill(locator.clone(), value.to_string()));
        self.check(locator, timeout)
    }

    fn press(&mut self, locator: &Locator, key: &str, timeout: Duration) -> SuiteResult<()> {
        self.calls.push(Call::Press(locator.clone(), key.to_string()));
        self.check(locator, timeout)
    }

    fn hover(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()> {
        self.calls.push(Call::Hover(locator.clone()));
        self.check(locator, timeout)
    }

    fn is_visible(&mut self, locator: &Locator) -> SuiteResult<bool> {
        self.calls.push(Call::IsVisible(locator.clone()));
        self.check(locator, Duration::ZERO)?;
        Ok(self.visible.contains(locator))
    }

    fn count(&mut self, locator: &Locator) -> SuiteResult<usize> {
        self.calls.push(Call::Count(locator.clone()));
        self.check(locator, Duration::ZERO)?;
        Ok(self
            .counts
            .iter()
            .find(|(l, _)| l == locator)
            .map(|(_, n)| *n)
            .unwrap_or(0))
    }

    fn all_text(&mut self, locator: &Locator) -> SuiteResult<Vec<String>> {
        self.calls.push(Call::AllText(locator.clone()));
        self.check(locator, Duration::ZERO)?;
        self.text_reads += 1;
        if self.changing_text {
            return Ok(vec![format!("sample {}", self.text_reads)]);
        }
        if let Some((_, _, texts)) = self
            .delayed_texts
            .iter()
            .find(|(l, due, _)| l == locator && Instant::now() >= *due)
        {
            return Ok(texts.clone());
        }
        Ok(self
            .texts
            .iter()
            .find(|(l, _)| l == locator)
            .map(|(_, t)| t.clone())
            .unwrap_or_default())
    }

    fn screenshot(&mut self, full_page: bool) -> SuiteResult<Vec<u8>> {
        self.calls.push(Call::Screenshot(full_page));
        if self.screenshot_fails {
            return Err(SuiteError::Session("page crashed".into()));
        }
        Ok(b"\x89PNG fake".to_vec())
    }

    fn evaluate(&mut self, script: &str) -> SuiteResult<Value> {
        self.calls.push(Call::Evaluate(script.to_string()));
        Ok(Value::Null)
    }

    fn pause(&mut self, duration: Duration) {
        self.calls.push(Call::Pause(duration));
        if self.real_pauses {
            std::thread::sleep(duration);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) -> SuiteResult<()> {
        self.calls.push(Call::Close);
        self.closed = true;
        if let Some(counter) = &self.closes {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
