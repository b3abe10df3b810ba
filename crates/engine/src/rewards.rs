//! Reward catalog entries, read-only for the engine.
//!
//! Catalog CRUD is owned by another service; the engine only needs the id,
//! the price (`required_points`) and whether the reward can still be bought.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardCategory {
    Toy,
    Snack,
    Experience,
    Money,
    #[default]
    Other,
}

impl RewardCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toy => "TOY",
            Self::Snack => "SNACK",
            Self::Experience => "EXPERIENCE",
            Self::Money => "MONEY",
            Self::Other => "OTHER",
        }
    }
}

impl TryFrom<&str> for RewardCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "TOY" => Ok(Self::Toy),
            "SNACK" => Ok(Self::Snack),
            "EXPERIENCE" => Ok(Self::Experience),
            "MONEY" => Ok(Self::Money),
            "OTHER" => Ok(Self::Other),
            other => Err(EngineError::Validation(format!(
                "invalid reward category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub required_points: i64,
    pub category: RewardCategory,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Reward {
    /// Whether a child can request this reward right now.
    pub fn is_available(&self) -> bool {
        self.active && self.required_points > 0
    }
}

/// A reward as seen from a child's dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOffer {
    pub reward: Reward,
    pub affordable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub required_points: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Reward {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            description: model.description,
            required_points: model.required_points,
            category: RewardCategory::try_from(model.category.as_str())?,
            image_url: model.image_url,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn require_available(reward: Option<Model>, reward_id: i64) -> ResultEngine<Reward> {
    let reward = reward
        .map(Reward::try_from)
        .transpose()?
        .ok_or_else(|| EngineError::RewardNotAvailable(format!("reward {reward_id} not found")))?;
    if !reward.is_available() {
        return Err(EngineError::RewardNotAvailable(format!(
            "reward {reward_id} is not active"
        )));
    }
    Ok(reward)
}
