//! Purchase workflow: request, approve, reject, cancel, list.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Actor, EngineError, NewPointTransaction, Purchase, PurchaseListFilter, PurchaseStatus,
    ResultEngine, TransactionKind, purchases, rewards,
};

use super::{Engine, balances::balance_of, ledger::append, with_tx};

const PURCHASE_REASON: &str = "purchase";

impl Engine {
    /// Opens a `PENDING` purchase, reserving the reward's price.
    ///
    /// The availability check and the insert happen under the child's lock,
    /// so two concurrent requests can never both pass against the same
    /// balance.
    pub async fn request_purchase(
        &self,
        actor: &Actor,
        child_id: i64,
        reward_id: i64,
    ) -> ResultEngine<Purchase> {
        actor.require_child_access(child_id)?;
        self.retry_once("request_purchase", || {
            self.request_purchase_once(child_id, reward_id)
        })
        .await
    }

    async fn request_purchase_once(&self, child_id: i64, reward_id: i64) -> ResultEngine<Purchase> {
        let _guards = self
            .locks
            .acquire(&[child_id], self.settings.lock_timeout)
            .await?;

        let purchase = with_tx!(self, |db_tx| {
            self.require_child(&db_tx, child_id).await?;
            let reward = rewards::Entity::find_by_id(reward_id).one(&db_tx).await?;
            let reward = rewards::require_available(reward, reward_id)?;

            let balance = balance_of(&db_tx, child_id).await?;
            if !balance.covers(reward.required_points) {
                return Err(EngineError::InsufficientPoints {
                    required: reward.required_points,
                    available: balance.available_points,
                });
            }

            let model = purchases::ActiveModel::pending(child_id, reward.id, reward.required_points)
                .insert(&db_tx)
                .await?;
            let mut purchase = Purchase::try_from((model, None::<rewards::Model>))?;
            purchase.reward_name = Some(reward.name);
            Ok::<_, EngineError>(purchase)
        })?;

        tracing::info!(
            purchase_id = purchase.id,
            child_id,
            reward_id,
            cost_points = purchase.cost_points,
            "purchase requested"
        );
        Ok(purchase)
    }

    /// Parent approval: writes the SPEND and closes the purchase.
    pub async fn approve_purchase(&self, actor: &Actor, purchase_id: i64) -> ResultEngine<Purchase> {
        actor.require_parent("approve purchases")?;
        self.retry_once("approve_purchase", || {
            self.decide_once(actor, purchase_id, PurchaseStatus::Approved)
        })
        .await
    }

    /// Parent rejection: the reservation lapses, nothing is written to the
    /// ledger.
    pub async fn reject_purchase(&self, actor: &Actor, purchase_id: i64) -> ResultEngine<Purchase> {
        actor.require_parent("reject purchases")?;
        self.retry_once("reject_purchase", || {
            self.decide_once(actor, purchase_id, PurchaseStatus::Rejected)
        })
        .await
    }

    /// Self-service cancellation by the child who made the request.
    pub async fn cancel_purchase(&self, actor: &Actor, purchase_id: i64) -> ResultEngine<Purchase> {
        if actor.is_parent() {
            return Err(EngineError::Forbidden(
                "only the requesting child can cancel a purchase".to_string(),
            ));
        }
        self.retry_once("cancel_purchase", || {
            self.decide_once(actor, purchase_id, PurchaseStatus::Cancelled)
        })
        .await
    }

    async fn find_purchase<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        purchase_id: i64,
    ) -> ResultEngine<purchases::Model> {
        purchases::Entity::find_by_id(purchase_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("purchase {purchase_id}")))
    }

    async fn decide_once(
        &self,
        actor: &Actor,
        purchase_id: i64,
        next: PurchaseStatus,
    ) -> ResultEngine<Purchase> {
        // The owning child is immutable, so it is safe to read it before
        // taking the lock; the status is re-read inside the critical section.
        let child_id = self.find_purchase(&self.database, purchase_id).await?.child_id;
        actor.require_child_access(child_id)?;

        let _guards = self
            .locks
            .acquire(&[child_id], self.settings.lock_timeout)
            .await?;

        let purchase = with_tx!(self, |db_tx| {
            let model = self.find_purchase(&db_tx, purchase_id).await?;
            let current = PurchaseStatus::try_from(model.status.as_str())?;
            current.transition(next).inspect_err(|err| {
                tracing::warn!(
                    purchase_id,
                    child_id,
                    requested = next.as_str(),
                    error = %err,
                    "purchase transition refused, likely a race or duplicate request"
                );
            })?;

            let reward = rewards::Entity::find_by_id(model.reward_id)
                .one(&db_tx)
                .await?;

            if next == PurchaseStatus::Approved {
                let balance = balance_of(&db_tx, child_id).await?;
                if balance.total_points < model.cost_points {
                    return Err(EngineError::InsufficientPoints {
                        required: model.cost_points,
                        available: balance.total_points,
                    });
                }
                let spend = NewPointTransaction::new(
                    child_id,
                    TransactionKind::Spend,
                    model.cost_points,
                    Some(PURCHASE_REASON.to_string()),
                    reward.as_ref().map(|r| r.name.clone()),
                )?;
                append(&db_tx, &spend).await?;
            }

            let mut active: purchases::ActiveModel = model.into();
            active.status = ActiveValue::Set(next.as_str().to_string());
            active.decided_at = ActiveValue::Set(Some(Utc::now()));
            let updated = active.update(&db_tx).await?;
            Purchase::try_from((updated, reward))
        })?;

        tracing::info!(
            purchase_id,
            child_id,
            status = purchase.status.as_str(),
            "purchase decided"
        );
        Ok(purchase)
    }

    /// Purchases matching `filter`, newest first.
    ///
    /// A child only ever sees its own purchases.
    pub async fn list_purchases(
        &self,
        actor: &Actor,
        filter: &PurchaseListFilter,
    ) -> ResultEngine<Vec<Purchase>> {
        let child_id = match (actor, filter.child_id) {
            (Actor::Child { child_id: own }, None) => Some(*own),
            (_, Some(child_id)) => {
                actor.require_child_access(child_id)?;
                Some(child_id)
            }
            (Actor::Parent { .. }, None) => None,
        };

        let mut query = purchases::Entity::find()
            .find_also_related(rewards::Entity)
            .order_by_desc(purchases::Column::RequestedAt)
            .order_by_desc(purchases::Column::Id);
        if let Some(child_id) = child_id {
            query = query.filter(purchases::Column::ChildId.eq(child_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchases::Column::Status.eq(status.as_str()));
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Purchase::try_from)
            .collect()
    }
}
