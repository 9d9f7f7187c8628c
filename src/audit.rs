//! In-memory audit trail of pipeline actions

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One recorded pipeline action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// When the action was recorded
    pub timestamp: NaiveDateTime,
    /// The component that performed the action
    pub actor: String,
    /// What was done, e.g. "load_dataset" or "variance_analysis"
    pub action: String,
    /// Action-specific details (counts, labels, thresholds)
    pub details: HashMap<String, String>,
}

/// Append-only log of what the pipeline did during a run.
///
/// Kept in memory and handed to the caller with the reports; the core does
/// no persistence of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty audit log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action with its details
    pub fn record(
        &mut self,
        actor: &str,
        action: &str,
        details: HashMap<String, String>,
    ) -> &AuditEntry {
        self.entries.push(AuditEntry {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            action: action.to_string(),
            details,
        });
        // Just pushed, cannot be empty
        self.entries.last().expect("entry just pushed")
    }

    /// All recorded entries, oldest first
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
