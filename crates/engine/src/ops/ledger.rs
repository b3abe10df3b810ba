//! The ledger store: append-only point transactions.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{
    Actor, EngineError, NewPointTransaction, PointTransaction, ResultEngine, transactions,
};

use super::Engine;

/// Largest page `history` hands out.
const MAX_HISTORY_LIMIT: u64 = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HistoryCursor {
    transaction_id: i64,
}

impl HistoryCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::Validation("invalid history cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::Validation("invalid history cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::Validation("invalid history cursor".to_string()))
    }
}

/// Appends one transaction and returns its id.
///
/// Runs on whatever connection the caller passes, so batches and purchase
/// approvals share the caller's DB transaction.
pub(super) async fn append<C: ConnectionTrait>(
    db: &C,
    tx: &NewPointTransaction,
) -> ResultEngine<i64> {
    if tx.points <= 0 {
        return Err(EngineError::Validation("points must be > 0".to_string()));
    }
    let res = transactions::Entity::insert(transactions::ActiveModel::from(tx))
        .exec(db)
        .await?;
    Ok(res.last_insert_id)
}

/// Every transaction of a child, oldest first.
pub(super) async fn list_by_child<C: ConnectionTrait>(
    db: &C,
    child_id: i64,
) -> ResultEngine<Vec<PointTransaction>> {
    transactions::Entity::find()
        .filter(transactions::Column::ChildId.eq(child_id))
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(PointTransaction::try_from)
        .collect()
}

impl Engine {
    /// Full ledger of a child in insertion order, suitable for replay/audit.
    pub async fn ledger(&self, actor: &Actor, child_id: i64) -> ResultEngine<Vec<PointTransaction>> {
        actor.require_child_access(child_id)?;
        self.require_child(&self.database, child_id).await?;
        list_by_child(&self.database, child_id).await
    }

    /// Point history for display, newest → older, with cursor-based
    /// pagination.
    ///
    /// `limit` is clamped to `1..=200`.
    pub async fn history(
        &self,
        actor: &Actor,
        child_id: i64,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<PointTransaction>, Option<String>)> {
        actor.require_child_access(child_id)?;
        self.require_child(&self.database, child_id).await?;

        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::ChildId.eq(child_id))
            .order_by_desc(transactions::Column::Id)
            .limit(limit.saturating_add(1));
        if let Some(cursor) = cursor {
            let cursor = HistoryCursor::decode(cursor)?;
            query = query.filter(transactions::Column::Id.lt(cursor.transaction_id));
        }

        let rows: Vec<transactions::Model> = query.all(&self.database).await?;
        let has_more = rows.len() > limit as usize;

        let mut out: Vec<PointTransaction> = Vec::with_capacity(rows.len().min(limit as usize));
        for model in rows.into_iter().take(limit as usize) {
            out.push(PointTransaction::try_from(model)?);
        }

        let next_cursor = if has_more {
            out.last()
                .map(|tx| HistoryCursor {
                    transaction_id: tx.id,
                })
                .map(|c| c.encode())
                .transpose()?
        } else {
            None
        };

        Ok((out, next_cursor))
    }
}
