use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{Actor, EngineError, ResultEngine, Reward, RewardOffer, rewards};

use super::{Engine, balances::balance_of};

impl Engine {
    /// Catalog lookup by id.
    pub async fn reward(&self, reward_id: i64) -> ResultEngine<Reward> {
        rewards::Entity::find_by_id(reward_id)
            .one(&self.database)
            .await?
            .map(Reward::try_from)
            .transpose()?
            .ok_or_else(|| EngineError::KeyNotFound(format!("reward {reward_id}")))
    }

    /// Active rewards, cheapest first, each flagged with whether the child
    /// could request it right now.
    pub async fn available_rewards(
        &self,
        actor: &Actor,
        child_id: i64,
    ) -> ResultEngine<Vec<RewardOffer>> {
        actor.require_child_access(child_id)?;
        self.require_child(&self.database, child_id).await?;
        let balance = balance_of(&self.database, child_id).await?;

        rewards::Entity::find()
            .filter(rewards::Column::Active.eq(true))
            .filter(rewards::Column::RequiredPoints.gt(0))
            .order_by_asc(rewards::Column::RequiredPoints)
            .order_by_asc(rewards::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| -> ResultEngine<RewardOffer> {
                let reward = Reward::try_from(model)?;
                let affordable = balance.covers(reward.required_points);
                Ok(RewardOffer { reward, affordable })
            })
            .collect()
    }
}
