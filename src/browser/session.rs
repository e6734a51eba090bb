use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::driver::Driver;
use crate::browser::protocol::{
    BrowserRequest, BrowserResponse, ElementState, ErrorKind, LaunchOptions, Locator, WaitUntil,
};
use crate::error::{SuiteError, SuiteResult};

/// Where to find the Playwright bridge and how to start the browser.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub node_binary: String,
    pub script: String,
    pub launch: LaunchOptions,
}

/// A persistent browser session backed by the Node.js Playwright bridge.
///
/// Launches a long-lived process that keeps one browser context open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    deadline: Option<(Instant, u64)>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the bridge, wait for its ready signal, then launch the browser.
    pub fn launch(config: &BridgeConfig) -> SuiteResult<Self> {
        let mut child = Command::new(&config.node_binary)
            .arg(&config.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| SuiteError::SpawnBridge {
                script: config.script.clone(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SuiteError::Session("Failed to capture bridge stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SuiteError::Session("Failed to capture bridge stdout".into()))?;

        let mut session = BrowserSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
            deadline: None,
            closed: false,
        };

        let ready = session.read_response()?;
        if !ready.ok || ready.ready != Some(true) {
            return Err(SuiteError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from bridge".into(),
            });
        }

        session.send_ok(&BrowserRequest::Launch {
            options: config.launch.clone(),
        })?;
        debug!(script = %config.script, "browser session ready");
        Ok(session)
    }

    /// Fail every command issued after `timeout` from now.
    pub fn set_deadline(&mut self, timeout: Duration) {
        self.deadline = Some((Instant::now() + timeout, timeout.as_millis() as u64));
    }

    fn check_deadline(&self) -> SuiteResult<()> {
        match self.deadline {
            Some((at, timeout_ms)) if Instant::now() >= at => {
                Err(SuiteError::ScenarioTimeout { timeout_ms })
            }
            _ => Ok(()),
        }
    }

    fn read_response(&mut self) -> SuiteResult<BrowserResponse> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| SuiteError::Session(format!("Failed to read from bridge stdout: {}", e)))?;

        if line.trim().is_empty() {
            self.closed = true;
            return Err(SuiteError::Session(
                "Empty response from bridge (process may have died)".into(),
            ));
        }

        Ok(serde_json::from_str(line.trim())?)
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> SuiteResult<BrowserResponse> {
        if self.closed {
            return Err(SuiteError::Session("Session is closed".into()));
        }
        let json = serde_json::to_string(request)?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| SuiteError::Session(format!("Failed to write to bridge stdin: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| SuiteError::Session(format!("Failed to flush bridge stdin: {}", e)))?;

        self.read_response()
    }

    /// Send a request and map a failure response onto the error taxonomy.
    fn send_ok(&mut self, request: &BrowserRequest) -> SuiteResult<BrowserResponse> {
        self.check_deadline()?;
        let response = self.send(request)?;
        if response.ok {
            return Ok(response);
        }

        let error = response
            .error
            .clone()
            .unwrap_or_else(|| "Unknown error".into());
        Err(match (response.kind, request) {
            (Some(ErrorKind::Timeout), BrowserRequest::Navigate { url, .. })
            | (Some(ErrorKind::Navigation), BrowserRequest::Navigate { url, .. }) => {
                SuiteError::NavigationFailure {
                    url: url.clone(),
                    reason: error,
                }
            }
            (Some(ErrorKind::Timeout), _) => SuiteError::LocatorTimeout {
                locator: request_locator(request),
                timeout_ms: request_timeout(request),
            },
            _ => SuiteError::SessionProtocol {
                command: request.name().into(),
                error,
            },
        })
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> SuiteResult<()> {
        if self.closed {
            return Ok(());
        }
        // Best-effort: the process may already be gone
        let _ = self.send(&BrowserRequest::Quit);
        self.closed = true;
        let _ = self.child.wait();
        Ok(())
    }
}

fn request_locator(request: &BrowserRequest) -> String {
    match request {
        BrowserRequest::WaitFor { locator, .. }
        | BrowserRequest::Click { locator, .. }
        | BrowserRequest::Fill { locator, .. }
        | BrowserRequest::Press { locator, .. }
        | BrowserRequest::Hover { locator, .. }
        | BrowserRequest::IsVisible { locator }
        | BrowserRequest::Count { locator }
        | BrowserRequest::AllText { locator } => locator.to_string(),
        other => other.name().to_string(),
    }
}

fn request_timeout(request: &BrowserRequest) -> u64 {
    match request {
        BrowserRequest::Navigate { timeout_ms, .. }
        | BrowserRequest::WaitFor { timeout_ms, .. }
        | BrowserRequest::Click { timeout_ms, .. }
        | BrowserRequest::Fill { timeout_ms, .. }
        | BrowserRequest::Press { timeout_ms, .. }
        | BrowserRequest::Hover { timeout_ms, .. } => *timeout_ms,
        _ => 0,
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

impl Driver for BrowserSession {
    fn navigate(&mut self, url: &str, wait_until: WaitUntil) -> SuiteResult<()> {
        // Bridge applies its own navigation timeout when this is 0
        self.send_ok(&BrowserRequest::Navigate {
            url: url.to_string(),
            wait_until,
            timeout_ms: 0,
        })?;
        Ok(())
    }

    fn wait_for(
        &mut self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> SuiteResult<()> {
        self.send_ok(&BrowserRequest::WaitFor {
            locator: locator.clone(),
            state,
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn click(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()> {
        self.send_ok(&BrowserRequest::Click {
            locator: locator.clone(),
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str, timeout: Duration) -> SuiteResult<()> {
        self.send_ok(&BrowserRequest::Fill {
            locator: locator.clone(),
            value: value.to_string(),
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn press(&mut self, locator: &Locator, key: &str, timeout: Duration) -> SuiteResult<()> {
        self.send_ok(&BrowserRequest::Press {
            locator: locator.clone(),
            key: key.to_string(),
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn hover(&mut self, locator: &Locator, timeout: Duration) -> SuiteResult<()> {
        self.send_ok(&BrowserRequest::Hover {
            locator: locator.clone(),
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn is_visible(&mut self, locator: &Locator) -> SuiteResult<bool> {
        let response = self.send_ok(&BrowserRequest::IsVisible {
            locator: locator.clone(),
        })?;
        Ok(response.visible.unwrap_or(false))
    }

    fn count(&mut self, locator: &Locator) -> SuiteResult<usize> {
        let response = self.send_ok(&BrowserRequest::Count {
            locator: locator.clone(),
        })?;
        Ok(response.count.unwrap_or(0))
    }

    fn all_text(&mut self, locator: &Locator) -> SuiteResult<Vec<String>> {
        let response = self.send_ok(&BrowserRequest::AllText {
            locator: locator.clone(),
        })?;
        Ok(response.texts.unwrap_or_default())
    }

    fn screenshot(&mut self, full_page: bool) -> SuiteResult<Vec<u8>> {
        let response = self.send_ok(&BrowserRequest::Screenshot { full_page })?;
        let data = response.data.ok_or_else(|| SuiteError::SessionProtocol {
            command: "screenshot".into(),
            error: "No data in screenshot response".into(),
        })?;
        STANDARD
            .decode(data.as_bytes())
            .map_err(|e| SuiteError::SessionProtocol {
                command: "screenshot".into(),
                error: format!("Invalid base64 payload: {}", e),
            })
    }

    fn evaluate(&mut self, script: &str) -> SuiteResult<Value> {
        let response = self.send_ok(&BrowserRequest::Evaluate {
            script: script.to_string(),
        })?;
        Ok(response.value.unwrap_or(Value::Null))
    }

    fn pause(&mut self, duration: Duration) {
        let duration = match self.deadline {
            Some((at, _)) => duration.min(at.saturating_duration_since(Instant::now())),
            None => duration,
        };
        std::thread::sleep(duration);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) -> SuiteResult<()> {
        self.quit()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("browser session cleanup failed: {}", e);
        }
    }
}
