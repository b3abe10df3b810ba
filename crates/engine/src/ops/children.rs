use sea_orm::{QueryOrder, prelude::*};

use crate::{Actor, Child, ChildProfile, ResultEngine, children};

use super::{Engine, balances::balance_of};

impl Engine {
    /// A child's profile with its derived balance.
    pub async fn child_profile(&self, actor: &Actor, child_id: i64) -> ResultEngine<ChildProfile> {
        actor.require_child_access(child_id)?;
        let model = self.require_child(&self.database, child_id).await?;
        let balance = balance_of(&self.database, child_id).await?;
        Ok(ChildProfile {
            child: Child::from(model),
            balance,
        })
    }

    /// Every child of the household with balances, ordered by id.
    pub async fn list_children(&self, actor: &Actor) -> ResultEngine<Vec<ChildProfile>> {
        actor.require_parent("list children")?;
        let models = children::Entity::find()
            .order_by_asc(children::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let balance = balance_of(&self.database, model.id).await?;
            out.push(ChildProfile {
                child: Child::from(model),
                balance,
            });
        }
        Ok(out)
    }
}
