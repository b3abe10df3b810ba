use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, children};

use super::Engine;

impl Engine {
    pub(super) async fn require_child<C: ConnectionTrait>(
        &self,
        db: &C,
        child_id: i64,
    ) -> ResultEngine<children::Model> {
        children::Entity::find_by_id(child_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::UnknownChild(vec![child_id]))
    }

    /// Ensures every id in `child_ids` exists; the error lists all missing ids.
    pub(super) async fn require_children<C: ConnectionTrait>(
        &self,
        db: &C,
        child_ids: &[i64],
    ) -> ResultEngine<Vec<children::Model>> {
        let found: Vec<children::Model> = children::Entity::find()
            .filter(children::Column::Id.is_in(child_ids.iter().copied()))
            .all(db)
            .await?;
        let missing: Vec<i64> = child_ids
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|child| child.id == *id))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::UnknownChild(missing));
        }
        Ok(found)
    }
}
