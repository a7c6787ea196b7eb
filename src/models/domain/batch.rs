use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::domain::{GenerationResult, GenerationStatus};

/// Recorded when a batch member produced no result at all (its task was lost).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub topic: String,
    pub username: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchEntry {
    Completed(GenerationResult),
    Aborted(BatchFailure),
}

impl BatchEntry {
    pub fn status(&self) -> GenerationStatus {
        match self {
            BatchEntry::Completed(result) => result.status,
            BatchEntry::Aborted(_) => GenerationStatus::Failed,
        }
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            BatchEntry::Completed(result) => Some(result),
            BatchEntry::Aborted(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub total_requests: usize,
    pub results: BTreeMap<String, BatchEntry>,
    pub summary: BatchSummary,
    pub total_processing_time: f64,
    pub generated_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn new(results: BTreeMap<String, BatchEntry>, total_processing_time: f64) -> Self {
        let mut summary = BatchSummary::default();
        for entry in results.values() {
            match entry.status() {
                GenerationStatus::Success => summary.succeeded += 1,
                GenerationStatus::Partial => summary.partial += 1,
                GenerationStatus::Failed => summary.failed += 1,
            }
        }

        Self {
            batch_id: Uuid::new_v4(),
            total_requests: results.len(),
            results,
            summary,
            total_processing_time,
            generated_at: Utc::now(),
        }
    }

    pub fn get(&self, topic: &str) -> Option<&BatchEntry> {
        self.results.get(topic)
    }
}
