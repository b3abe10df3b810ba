//! Command structs for engine operations.
//!
//! These types group parameters for write operations (award, deduct) and
//! listings, keeping call sites readable and avoiding long argument lists.

use crate::PurchaseStatus;

/// Apply the same point change to a batch of children.
///
/// Used by both [`Engine::award`](crate::Engine::award) (EARN) and
/// [`Engine::deduct`](crate::Engine::deduct) (manual SPEND).
#[derive(Clone, Debug)]
pub struct PointsCmd {
    pub child_ids: Vec<i64>,
    pub points: i64,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl PointsCmd {
    #[must_use]
    pub fn new(child_ids: impl IntoIterator<Item = i64>, points: i64) -> Self {
        Self {
            child_ids: child_ids.into_iter().collect(),
            points,
            reason: None,
            message: None,
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Filters for listing purchases.
#[derive(Clone, Debug, Default)]
pub struct PurchaseListFilter {
    /// `None` lists every status.
    pub status: Option<PurchaseStatus>,
    pub child_id: Option<i64>,
}

impl PurchaseListFilter {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: Some(PurchaseStatus::Pending),
            child_id: None,
        }
    }

    #[must_use]
    pub fn child(mut self, child_id: i64) -> Self {
        self.child_id = Some(child_id);
        self
    }
}
