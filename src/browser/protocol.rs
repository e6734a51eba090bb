use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an element is found in the remote document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Engine {
    Css { value: String },
    Xpath { value: String },
    /// Accessible role plus accessible name, e.g. `button` / `Popular`
    Role { role: String, name: String },
}

/// A locator expression, optionally narrowed by text, index, or a parent scope.
///
/// Mirrors what the bridge understands: the parent is resolved first, the
/// engine is applied inside it, then `has_text` filters, then `nth` picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub engine: Engine,
    #[serde(rename = "hasText", skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Locator>>,
}

impl Locator {
    fn from_engine(engine: Engine) -> Self {
        Self {
            engine,
            has_text: None,
            nth: None,
            parent: None,
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::from_engine(Engine::Css {
            value: value.into(),
        })
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::from_engine(Engine::Xpath {
            value: value.into(),
        })
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_engine(Engine::Role {
            role: role.into(),
            name: name.into(),
        })
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    pub fn has_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Scope this locator inside `parent`.
    pub fn within(mut self, parent: Locator) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} >> ", parent)?;
        }
        match &self.engine {
            Engine::Css { value } => write!(f, "css={}", value)?,
            Engine::Xpath { value } => write!(f, "xpath={}", value)?,
            Engine::Role { role, name } => write!(f, "role={}[name=\"{}\"]", role, name)?,
        }
        if let Some(text) = &self.has_text {
            write!(f, " :has-text(\"{}\")", text)?;
        }
        if let Some(n) = self.nth {
            write!(f, " >> nth={}", n)?;
        }
        Ok(())
    }
}

/// Element state a bounded wait can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Load milestone a navigation waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

/// Browser options sent once, right after the bridge reports ready.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub ignore_https_errors: bool,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_dir: Option<String>,
}

/// Request sent to the bridge over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Launch {
        options: LaunchOptions,
    },
    Navigate {
        url: String,
        #[serde(rename = "waitUntil")]
        wait_until: WaitUntil,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    WaitFor {
        locator: Locator,
        state: ElementState,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    Click {
        locator: Locator,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    Fill {
        locator: Locator,
        value: String,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    Press {
        locator: Locator,
        key: String,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    Hover {
        locator: Locator,
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },
    IsVisible {
        locator: Locator,
    },
    Count {
        locator: Locator,
    },
    AllText {
        locator: Locator,
    },
    Screenshot {
        #[serde(rename = "fullPage")]
        full_page: bool,
    },
    Evaluate {
        script: String,
    },
    Quit,
}

impl BrowserRequest {
    /// Command name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Launch { .. } => "launch",
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::WaitFor { .. } => "wait_for",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::Fill { .. } => "fill",
            BrowserRequest::Press { .. } => "press",
            BrowserRequest::Hover { .. } => "hover",
            BrowserRequest::IsVisible { .. } => "is_visible",
            BrowserRequest::Count { .. } => "count",
            BrowserRequest::AllText { .. } => "all_text",
            BrowserRequest::Screenshot { .. } => "screenshot",
            BrowserRequest::Evaluate { .. } => "evaluate",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Failure category the bridge attaches to an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    Navigation,
    Other,
}

/// Response received from the bridge over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub kind: Option<ErrorKind>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    /// Base64 PNG for screenshots
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}
