//! Children of the household.
//!
//! The core never mutates a child row: points live in the ledger and the
//! profile fields belong to the (external) household management service.
//! `username`/`auth_key` are only read by the identity adapter.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Balance;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A child together with its derived balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub child: Child,
    pub balance: Balance,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "children")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub birth_date: Option<Date>,
    pub profile_image: Option<String>,
    #[sea_orm(unique)]
    pub username: String,
    pub auth_key: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Child {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            birth_date: model.birth_date,
            profile_image: model.profile_image,
            created_at: model.created_at,
        }
    }
}
