use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Machine readable error codes, paired with a human message in every error
/// response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    InsufficientPoints,
    RewardNotAvailable,
    InvalidState,
    UnknownChild,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Error {
    pub error: String,
    pub code: ErrorCode,
}

pub mod points {
    use super::*;

    /// Request body shared by award and deduct.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PointsBatch {
        pub child_ids: Vec<i64>,
        pub points: i64,
        pub reason: Option<String>,
        pub message: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TransactionKind {
        Earn,
        Spend,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Balance {
        pub total_points: i64,
        pub reserved_points: i64,
        pub available_points: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: i64,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub points: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Query string of `GET /children/{id}/history`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HistoryResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }
}

pub mod children {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ChildProfile {
        pub id: i64,
        pub name: String,
        pub birth_date: Option<NaiveDate>,
        pub profile_image: Option<String>,
        pub created_at: DateTime<Utc>,
        pub total_points: i64,
        pub reserved_points: i64,
        pub available_points: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChildrenResponse {
        pub children: Vec<ChildProfile>,
    }
}

pub mod rewards {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RewardCategory {
        Toy,
        Snack,
        Experience,
        Money,
        Other,
    }

    /// A catalog reward as offered to one child.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RewardOffer {
        pub id: i64,
        pub name: String,
        pub description: Option<String>,
        pub required_points: i64,
        pub category: RewardCategory,
        pub image_url: Option<String>,
        pub affordable: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RewardsResponse {
        pub rewards: Vec<RewardOffer>,
    }
}

pub mod purchases {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PurchaseStatus {
        Pending,
        Approved,
        Rejected,
        Cancelled,
    }

    /// `status` filter of `GET /purchases`; `ALL` disables it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum StatusFilter {
        #[default]
        All,
        Pending,
        Approved,
        Rejected,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchaseNew {
        pub child_id: i64,
        pub reward_id: i64,
    }

    /// Outcome of every purchase write.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchaseStatusResponse {
        pub purchase_id: i64,
        pub status: PurchaseStatus,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchaseListQuery {
        #[serde(default)]
        pub status: StatusFilter,
        pub child_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchaseView {
        pub id: i64,
        pub child_id: i64,
        pub reward_id: i64,
        pub reward_name: Option<String>,
        pub cost_points: i64,
        pub status: PurchaseStatus,
        pub requested_at: DateTime<Utc>,
        pub decided_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchasesResponse {
        pub purchases: Vec<PurchaseView>,
    }
}
