use sea_orm::{ConnectionTrait, QueryFilter, QuerySelect, prelude::*};

use crate::{Actor, Balance, PurchaseStatus, ResultEngine, purchases};

use super::{Engine, ledger::list_by_child};

/// Computes a child's balance from the ledger and its `PENDING` purchases.
///
/// When called with a DB transaction while holding the child's lock, the
/// result is authoritative for the duration of the critical section.
pub(super) async fn balance_of<C: ConnectionTrait>(db: &C, child_id: i64) -> ResultEngine<Balance> {
    let ledger = list_by_child(db, child_id).await?;
    let pending_costs: Vec<i64> = purchases::Entity::find()
        .select_only()
        .column(purchases::Column::CostPoints)
        .filter(purchases::Column::ChildId.eq(child_id))
        .filter(purchases::Column::Status.eq(PurchaseStatus::Pending.as_str()))
        .into_tuple()
        .all(db)
        .await?;
    Balance::fold(&ledger, pending_costs)
}

impl Engine {
    /// `{total, reserved, available}` for a child.
    ///
    /// Read-only and lock-free; writers recompute it inside their own
    /// critical section.
    pub async fn balance(&self, actor: &Actor, child_id: i64) -> ResultEngine<Balance> {
        actor.require_child_access(child_id)?;
        self.require_child(&self.database, child_id).await?;
        balance_of(&self.database, child_id).await
    }
}
