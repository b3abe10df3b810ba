//! Derived balances.
//!
//! Nothing here is stored: a [`Balance`] is a fold over the ledger plus the
//! cost of the child's `PENDING` purchases.

use serde::{Deserialize, Serialize};

use crate::{EngineError, PointTransaction, ResultEngine, TransactionKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// All-time EARN minus SPEND.
    pub total_points: i64,
    /// Held back by open purchase requests.
    pub reserved_points: i64,
    /// `total_points - reserved_points`.
    pub available_points: i64,
}

impl Balance {
    pub fn new(total_points: i64, reserved_points: i64) -> Self {
        Self {
            total_points,
            reserved_points,
            available_points: total_points - reserved_points,
        }
    }

    /// Folds ledger entries and pending reservation costs into a balance.
    ///
    /// Fails with [`EngineError::Validation`] if any sum leaves `i64`.
    pub fn fold<'a, T, P>(transactions: T, pending_costs: P) -> ResultEngine<Self>
    where
        T: IntoIterator<Item = &'a PointTransaction>,
        P: IntoIterator<Item = i64>,
    {
        let total = total_points(
            transactions
                .into_iter()
                .map(|tx| (tx.kind, tx.points)),
        )?;
        let reserved = pending_costs
            .into_iter()
            .try_fold(0_i64, i64::checked_add)
            .ok_or_else(overflow)?;
        let available = total.checked_sub(reserved).ok_or_else(overflow)?;
        Ok(Self {
            total_points: total,
            reserved_points: reserved,
            available_points: available,
        })
    }

    /// Whether `cost` more points can be reserved or spent.
    pub fn covers(&self, cost: i64) -> bool {
        self.available_points >= cost
    }
}

pub(crate) fn total_points<I>(entries: I) -> ResultEngine<i64>
where
    I: IntoIterator<Item = (TransactionKind, i64)>,
{
    entries
        .into_iter()
        .try_fold(0_i64, |acc, (kind, points)| acc.checked_add(kind.signed(points)))
        .ok_or_else(overflow)
}

fn overflow() -> EngineError {
    EngineError::Validation("point total out of range".to_string())
}
