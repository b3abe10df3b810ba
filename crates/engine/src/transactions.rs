//! Point transaction primitives.
//!
//! A [`PointTransaction`] is an immutable ledger fact. The magnitude is always
//! positive; the polarity lives in [`TransactionKind`]. Corrections are new
//! offsetting transactions, rows are never updated or deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Earn,
    Spend,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Earn => "EARN",
            Self::Spend => "SPEND",
        }
    }

    /// Signed contribution of `points` to the all-time total.
    pub fn signed(self, points: i64) -> i64 {
        match self {
            Self::Earn => points,
            Self::Spend => -points,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EARN" => Ok(Self::Earn),
            "SPEND" => Ok(Self::Spend),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// A transaction that has not been appended yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPointTransaction {
    pub child_id: i64,
    pub kind: TransactionKind,
    pub points: i64,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPointTransaction {
    pub fn new(
        child_id: i64,
        kind: TransactionKind,
        points: i64,
        reason: Option<String>,
        message: Option<String>,
    ) -> ResultEngine<Self> {
        if points <= 0 {
            return Err(EngineError::Validation("points must be > 0".to_string()));
        }
        Ok(Self {
            child_id,
            kind,
            points,
            reason,
            message,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTransaction {
    pub id: i64,
    pub child_id: i64,
    pub kind: TransactionKind,
    pub points: i64,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub child_id: i64,
    pub kind: String,
    pub points: i64,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::children::Entity",
        from = "Column::ChildId",
        to = "super::children::Column::Id"
    )]
    Children,
}

impl Related<super::children::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Children.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewPointTransaction> for ActiveModel {
    fn from(tx: &NewPointTransaction) -> Self {
        Self {
            id: ActiveValue::NotSet,
            child_id: ActiveValue::Set(tx.child_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            points: ActiveValue::Set(tx.points),
            reason: ActiveValue::Set(tx.reason.clone()),
            message: ActiveValue::Set(tx.message.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for PointTransaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            child_id: model.child_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            points: model.points,
            reason: model.reason,
            message: model.message,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_points() {
        for points in [0, -5] {
            let err = NewPointTransaction::new(1, TransactionKind::Earn, points, None, None)
                .unwrap_err();
            assert_eq!(
                err,
                EngineError::Validation("points must be > 0".to_string())
            );
        }
    }

    #[test]
    fn kind_carries_the_sign() {
        assert_eq!(TransactionKind::Earn.signed(7), 7);
        assert_eq!(TransactionKind::Spend.signed(7), -7);
        assert_eq!(
            TransactionKind::try_from("SPEND").unwrap(),
            TransactionKind::Spend
        );
        assert!(TransactionKind::try_from("spend").is_err());
    }
}
