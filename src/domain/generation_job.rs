use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GenerationStatus;

/// Progress record of the exam generation job for one file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub status: GenerationStatus,
    #[serde(default)]
    pub chunks_processed: usize,
    #[serde(default)]
    pub total_chunks: usize,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerationJob {
    /// A freshly (re)started job. Counters reset, chunk count unknown yet.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            status: GenerationStatus::Processing,
            chunks_processed: 0,
            total_chunks: 0,
            started_at: Some(now),
            completed_at: None,
            error: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GenerationStatus::Processing
    }

    pub fn record_total_chunks(&mut self, total_chunks: usize) {
        if self.is_active() {
            self.total_chunks = total_chunks;
        }
    }

    /// Advances progress. Never moves backwards and never passes `total_chunks`.
    pub fn record_chunks_processed(&mut self, chunks_processed: usize) {
        if self.is_active() {
            let bounded = chunks_processed.min(self.total_chunks);
            self.chunks_processed = self.chunks_processed.max(bounded);
        }
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        if self.is_active() {
            self.status = GenerationStatus::Completed;
            self.completed_at = Some(now);
        }
    }

    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        if self.is_active() {
            self.status = GenerationStatus::Failed;
            self.error = Some(message.into());
            self.completed_at = Some(now);
        }
    }

    pub fn progress_percent(&self) -> u8 {
        if self.total_chunks == 0 {
            return 0;
        }
        let ratio = self.chunks_processed as f64 / self.total_chunks as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
