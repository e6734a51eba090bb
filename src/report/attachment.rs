use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// A blob attached to a scenario's report entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// An attachment after the runner has persisted it next to the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub name: String,
    pub content_type: String,
    pub path: String,
}

/// Collects attachments for the scenario that is currently running.
///
/// Only exists while a scenario is active; the logger attaches to it when
/// one is handed in and silently skips otherwise.
#[derive(Debug, Default)]
pub struct ReportContext {
    attachments: Mutex<Vec<Attachment>>,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        body: Vec<u8>,
    ) -> Result<(), String> {
        let mut attachments = self
            .attachments
            .lock()
            .map_err(|e| format!("attachment list poisoned: {}", e))?;
        attachments.push(Attachment {
            name: name.into(),
            content_type: content_type.into(),
            body,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.attachments.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain everything attached so far.
    pub fn take(&self) -> Vec<Attachment> {
        match self.attachments.lock() {
            Ok(mut a) => std::mem::take(&mut *a),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
