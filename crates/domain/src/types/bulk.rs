//! Bulk processing records

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::PostalError;
use crate::impl_domain_enum_conversions;

/// Outcome of one input in a bulk run
///
/// Exactly one of response and error is present; `result` encodes that.
#[derive(Debug, Clone)]
pub struct BulkResult<Req, Resp> {
    /// Position of the request in the input
    pub index: usize,
    pub request: Req,
    pub result: Result<Resp, PostalError>,
}

impl<Req, Resp> BulkResult<Req, Resp> {
    #[must_use]
    pub fn new(index: usize, request: Req, result: Result<Resp, PostalError>) -> Self {
        Self { index, request, result }
    }

    #[must_use]
    pub fn response(&self) -> Option<&Resp> {
        self.result.as_ref().ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&PostalError> {
        self.result.as_ref().err()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn outcome(&self) -> BulkOutcome {
        match &self.result {
            Ok(_) => BulkOutcome::Succeeded,
            Err(err) => BulkOutcome::from_error(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl_domain_enum_conversions!(BulkOutcome {
    Succeeded => "succeeded",
    Failed => "failed",
    Cancelled => "cancelled",
});

impl BulkOutcome {
    #[must_use]
    pub fn from_error(err: &PostalError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Failed
        }
    }
}

/// Progress event emitted once per finished input
///
/// `completed` counts finished inputs across the whole run, so successive
/// events observe strictly increasing values from 1 to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkProgress {
    pub index: usize,
    pub completed: usize,
    pub total: usize,
    pub outcome: BulkOutcome,
}

impl BulkProgress {
    /// Completed fraction in `[0.0, 1.0]`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Progress callback; may be invoked concurrently from several workers
pub type ProgressCallback = Arc<dyn Fn(&BulkProgress) + Send + Sync>;
