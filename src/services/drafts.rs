//! Draft Persistence
//!
//! Best-effort autosave of an in-progress intake form. Drafts expire after a
//! freshness window, and nothing here may block or fail an estimate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::IntakeForm;

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(750);

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("draft file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDraft {
    pub saved_at: DateTime<Utc>,
    pub form: IntakeForm,
}

pub struct DraftStore {
    path: PathBuf,
    freshness: Duration,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            freshness: DEFAULT_FRESHNESS,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub async fn save(&self, form: &IntakeForm) -> Result<(), DraftError> {
        self.save_at(form, Utc::now()).await
    }

    async fn save_at(&self, form: &IntakeForm, saved_at: DateTime<Utc>) -> Result<(), DraftError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let draft = StoredDraft {
            saved_at,
            form: form.clone(),
        };
        let content = serde_json::to_string_pretty(&draft)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Load the draft if one exists and is still fresh. Stale drafts are removed.
    pub async fn load(&self) -> Result<Option<IntakeForm>, DraftError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).await?;
        let draft: StoredDraft = serde_json::from_str(&content)?;

        let age = Utc::now().signed_duration_since(draft.saved_at);
        let fresh = age.to_std().map(|a| a <= self.freshness).unwrap_or(true);
        if !fresh {
            debug!(path = %self.path.display(), "discarding stale draft");
            self.clear().await?;
            return Ok(None);
        }
        Ok(Some(draft.form))
    }

    pub async fn clear(&self) -> Result<(), DraftError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Debounced background saver: a burst of updates results in one write of
/// the latest form.
pub struct DraftAutosaver {
    tx: mpsc::UnboundedSender<IntakeForm>,
    handle: JoinHandle<()>,
}

impl DraftAutosaver {
    pub fn spawn(store: Arc<DraftStore>, debounce: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<IntakeForm>();
        let handle = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    match tokio::time::timeout(debounce, rx.recv()).await {
                        Ok(Some(newer)) => latest = newer,
                        // Quiet period elapsed, or the sender hung up: flush.
                        Ok(None) | Err(_) => break,
                    }
                }
                if let Err(e) = store.save(&latest).await {
                    warn!("draft autosave failed: {}", e);
                }
            }
        });
        Self { tx, handle }
    }

    /// Queue the current form state. Never fails from the caller's view.
    pub fn update(&self, form: IntakeForm) {
        if self.tx.send(form).is_err() {
            warn!("draft autosaver has stopped; update dropped");
        }
    }

    /// Flush any pending draft and stop the background task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!("draft autosaver task ended abnormally: {}", e);
        }
    }
}
