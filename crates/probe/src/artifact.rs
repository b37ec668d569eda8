//! Per-scenario test info and file attachments.
//!
//! Attachments land under `<output_dir>/<sanitised title>/` so a run leaves
//! one directory per scenario that produced diagnostics.

use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// A file written for a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment name as given by the caller
    pub name: String,
    /// Where the body was written
    pub path: PathBuf,
    /// MIME type of the body
    pub content_type: String,
}

/// Identity and artifact sink of one running scenario
#[derive(Debug)]
pub struct TestInfo {
    title: String,
    output_dir: PathBuf,
    attachments: Mutex<Vec<Attachment>>,
}

impl TestInfo {
    /// Create test info; nothing is written until the first attachment.
    #[must_use]
    pub fn new(title: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            output_dir: output_dir.into(),
            attachments: Mutex::new(Vec::new()),
        }
    }

    /// Scenario title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Directory this scenario's attachments go to
    #[must_use]
    pub fn artifact_dir(&self) -> PathBuf {
        self.output_dir.join(sanitize(&self.title))
    }

    /// Write `body` as an attachment and record it.
    pub async fn attach(
        &self,
        name: &str,
        body: impl AsRef<[u8]>,
        content_type: &str,
    ) -> ProbeResult<Attachment> {
        let dir = self.artifact_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.{}", sanitize(name), extension(content_type)));
        tokio::fs::write(&path, body.as_ref()).await?;
        tracing::info!(title = %self.title, path = %path.display(), "attached {name}");

        let attachment = Attachment {
            name: name.to_string(),
            path,
            content_type: content_type.to_string(),
        };
        self.attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(attachment.clone());
        Ok(attachment)
    }

    /// Everything attached so far
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `-`, collapsing runs.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

fn extension(content_type: &str) -> &'static str {
    match content_type.split(';').next().map(str::trim) {
        Some("application/json") => "json",
        Some("text/plain") => "txt",
        Some("text/html") => "html",
        Some("image/png") => "png",
        _ => "bin",
    }
}
