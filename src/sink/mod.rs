//! Result persistence
//!
//! The orchestration core never touches a database. Callers hand finished
//! batch and traversal results to a [`ResultSink`]; [`SqliteSink`] stores
//! them as one run row plus one row per page.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteSink;
pub use traits::{ResultSink, SinkError, SinkResult};

/// Kind of orchestration a run recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Batch,
    Traversal,
}

impl RunKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Traversal => "traversal",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "batch" => Some(Self::Batch),
            "traversal" => Some(Self::Traversal),
            _ => None,
        }
    }
}

/// Outcome of one page task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Completed,
    Failed,
}

impl PageStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A recorded run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub kind: RunKind,
    pub label: String,
    /// Seed URL of a traversal
    pub seed: Option<String>,
    pub config_hash: Option<String>,
    /// When the run was written to the sink (RFC 3339)
    pub recorded_at: String,
    pub total_pages: u32,
    pub completed: u32,
    pub failed: u32,
}

/// A recorded page
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub run_id: i64,
    /// Index within the run, in recorded order
    pub position: u32,
    pub url: String,
    /// Link depth, for traversal pages
    pub depth: Option<u32>,
    pub status: PageStatus,
    pub title: Option<String>,
    pub error: Option<String>,
    /// The full fetch result as JSON
    pub result_json: String,
    pub recorded_at: String,
}
