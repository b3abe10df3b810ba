//! Purchase requests and their state machine.
//!
//! ```text
//! PENDING ──approve──▶ APPROVED
//!    │ ────reject───▶ REJECTED
//!    └─────cancel───▶ CANCELLED
//! ```
//!
//! Every state except `PENDING` is terminal. While `PENDING`, a purchase
//! reserves `cost_points` of the child's balance; the reservation is derived
//! from this table and never stored anywhere else.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validates `self -> next`. Only `PENDING` may move, and only to a
    /// terminal state.
    pub fn transition(self, next: PurchaseStatus) -> ResultEngine<PurchaseStatus> {
        match (self, next) {
            (Self::Pending, Self::Approved | Self::Rejected | Self::Cancelled) => Ok(next),
            (from, to) => Err(EngineError::InvalidState(format!(
                "cannot move purchase from {} to {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

impl TryFrom<&str> for PurchaseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid purchase status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub child_id: i64,
    pub reward_id: i64,
    /// Reward name at listing time, if the catalog still has it.
    pub reward_name: Option<String>,
    pub cost_points: i64,
    pub status: PurchaseStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub child_id: i64,
    pub reward_id: i64,
    pub cost_points: i64,
    pub status: String,
    pub requested_at: DateTimeUtc,
    pub decided_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::children::Entity",
        from = "Column::ChildId",
        to = "super::children::Column::Id"
    )]
    Children,
    #[sea_orm(
        belongs_to = "super::rewards::Entity",
        from = "Column::RewardId",
        to = "super::rewards::Column::Id"
    )]
    Rewards,
}

impl Related<super::children::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Children.def()
    }
}

impl Related<super::rewards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rewards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn pending(child_id: i64, reward_id: i64, cost_points: i64) -> Self {
        Self {
            id: ActiveValue::NotSet,
            child_id: ActiveValue::Set(child_id),
            reward_id: ActiveValue::Set(reward_id),
            cost_points: ActiveValue::Set(cost_points),
            status: ActiveValue::Set(PurchaseStatus::Pending.as_str().to_string()),
            requested_at: ActiveValue::Set(Utc::now()),
            decided_at: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<(Model, Option<super::rewards::Model>)> for Purchase {
    type Error = EngineError;

    fn try_from(
        (model, reward): (Model, Option<super::rewards::Model>),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            child_id: model.child_id,
            reward_id: model.reward_id,
            reward_name: reward.map(|r| r.name),
            cost_points: model.cost_points,
            status: PurchaseStatus::try_from(model.status.as_str())?,
            requested_at: model.requested_at,
            decided_at: model.decided_at,
        })
    }
}
