//! Maps HTTP Basic credentials to an engine [`Actor`].
//!
//! Parents log in with `users.username`/`users.password`, children with
//! `children.username`/`children.auth_key`. Parents are tried first.

use engine::Actor;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub mod parent {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// The login columns of `children`; the rest belongs to the engine.
pub mod child_login {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "children")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub username: String,
        pub auth_key: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn resolve(
    db: &DatabaseConnection,
    username: &str,
    secret: &str,
) -> Result<Option<Actor>, DbErr> {
    if username.is_empty() || secret.is_empty() {
        return Ok(None);
    }

    let parent = parent::Entity::find()
        .filter(parent::Column::Username.eq(username))
        .filter(parent::Column::Password.eq(secret))
        .one(db)
        .await?;
    if let Some(parent) = parent {
        return Ok(Some(Actor::parent(parent.username)));
    }

    let child = child_login::Entity::find()
        .filter(child_login::Column::Username.eq(username))
        .filter(child_login::Column::AuthKey.eq(secret))
        .one(db)
        .await?;
    Ok(child.map(|child| Actor::child(child.id)))
}
