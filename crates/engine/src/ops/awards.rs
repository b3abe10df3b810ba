//! Award service: batch EARN (award) and manual SPEND (deduct).
//!
//! A batch is all-or-nothing: one unknown child, or one child that cannot
//! cover a deduction, aborts the whole batch before anything is written.

use sea_orm::TransactionTrait;

use crate::{
    Actor, EngineError, NewPointTransaction, PointsCmd, ResultEngine, TransactionKind,
    util::{normalize_child_ids, normalize_optional_text, validate_batch_points},
};

use super::{Engine, balances::balance_of, ledger::append, with_tx};

/// A validated batch, ready to be applied.
#[derive(Clone, Debug)]
struct Batch {
    kind: TransactionKind,
    child_ids: Vec<i64>,
    points: i64,
    reason: Option<String>,
    message: Option<String>,
}

impl Engine {
    /// Award `cmd.points` to every child in the batch (one EARN each).
    ///
    /// Returns the ids of the appended transactions, in ascending child id
    /// order.
    pub async fn award(&self, actor: &Actor, cmd: PointsCmd) -> ResultEngine<Vec<i64>> {
        actor.require_parent("award points")?;
        let batch = self.validate_batch(TransactionKind::Earn, &cmd)?;
        self.retry_once("award", || self.apply_batch(&batch)).await
    }

    /// Deduct `cmd.points` from every child in the batch (one SPEND each).
    ///
    /// Refused with [`EngineError::InsufficientPoints`] if any child's
    /// available points cannot cover the deduction.
    pub async fn deduct(&self, actor: &Actor, cmd: PointsCmd) -> ResultEngine<Vec<i64>> {
        actor.require_parent("deduct points")?;
        let batch = self.validate_batch(TransactionKind::Spend, &cmd)?;
        self.retry_once("deduct", || self.apply_batch(&batch)).await
    }

    fn validate_batch(&self, kind: TransactionKind, cmd: &PointsCmd) -> ResultEngine<Batch> {
        validate_batch_points(cmd.points, self.settings.max_award_points)?;
        Ok(Batch {
            kind,
            child_ids: normalize_child_ids(&cmd.child_ids)?,
            points: cmd.points,
            reason: normalize_optional_text(cmd.reason.as_deref()),
            message: normalize_optional_text(cmd.message.as_deref()),
        })
    }

    async fn apply_batch(&self, batch: &Batch) -> ResultEngine<Vec<i64>> {
        let guards = self
            .locks
            .acquire(&batch.child_ids, self.settings.lock_timeout)
            .await?;

        let ids = with_tx!(self, |db_tx| {
            self.require_children(&db_tx, guards.child_ids()).await?;

            for &child_id in guards.child_ids() {
                let balance = balance_of(&db_tx, child_id).await?;
                match batch.kind {
                    TransactionKind::Spend if !balance.covers(batch.points) => {
                        return Err(EngineError::InsufficientPoints {
                            required: batch.points,
                            available: balance.available_points,
                        });
                    }
                    TransactionKind::Earn
                        if balance.total_points.checked_add(batch.points).is_none() =>
                    {
                        return Err(EngineError::Validation(format!(
                            "points would overflow the total of child {child_id}"
                        )));
                    }
                    _ => {}
                }
            }

            let mut ids = Vec::with_capacity(guards.child_ids().len());
            for &child_id in guards.child_ids() {
                let tx = NewPointTransaction::new(
                    child_id,
                    batch.kind,
                    batch.points,
                    batch.reason.clone(),
                    batch.message.clone(),
                )?;
                ids.push(append(&db_tx, &tx).await?);
            }
            Ok::<_, EngineError>(ids)
        })?;

        tracing::info!(
            kind = batch.kind.as_str(),
            points = batch.points,
            child_ids = ?guards.child_ids(),
            "points batch committed"
        );
        Ok(ids)
    }
}
