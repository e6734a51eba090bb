use std::time::Duration;

use serde_json::Value;

use crate::browser::protocol::{ElementState, Locator, WaitUntil};
use crate::error::SuiteResult;

// ============================================================================
// Driver trait — the only surface the page object speaks to
// ============================================================================

/// One isolated browser session.
///
/// `BrowserSession` is the live implementation; tests script an in-memory
/// one. Every call that waits carries its own upper bound.
pub trait Driver: Send {
    fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> SuiteResult<()>;

    /// Block until `locator` reaches `state`, or fail with `LocatorTimeout`.
    fn wait_for(
        &mut self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> SuiteResult<()>;

    fn click(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()>;

    fn fill(&mut self, locator: &Locator, value: &str, timeout: Duration) -> SuiteResult<()>;

    fn press(&mut self, locator: &Locator, key: &str, timeout: Duration) -> SuiteResult<()>;

    fn hover(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()>;

    /// Immediate check, no waiting.
    fn is_visible(&mut self, locator: &Locator) -> SuiteResult<bool>;

    fn count(&mut self, locator: &Locator) -> SuiteResult<usize>;

    /// Trimmed text content of every match, in document order.
    fn all_text(&mut self, locator: &Locator) -> SuiteResult<Vec<String>>;

    /// PNG bytes of the viewport, or the whole page.
    fn screenshot(&mut self, full_page: bool) -> SuiteResult<Vec<u8>>;

    fn evaluate(&mut self, script: &str) -> SuiteResult<Value>;

    /// Fixed delay. Sessions that enforce a deadline may cut it short.
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn is_closed(&self) -> bool;

    fn close(&mut self) -> SuiteResult<()>;
}
