//! Read-only child endpoints: profiles, balances, history, reward offers.

use api_types::{
    children::{ChildProfile, ChildrenResponse},
    points::{Balance, HistoryQuery, HistoryResponse, TransactionKind, TransactionView},
    rewards::{RewardCategory, RewardOffer, RewardsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use engine::Actor;

use crate::{ServerError, server::ServerState};

const DEFAULT_HISTORY_LIMIT: u64 = 20;

fn balance_view(balance: engine::Balance) -> Balance {
    Balance {
        total_points: balance.total_points,
        reserved_points: balance.reserved_points,
        available_points: balance.available_points,
    }
}

fn profile_view(profile: engine::ChildProfile) -> ChildProfile {
    let engine::ChildProfile { child, balance } = profile;
    ChildProfile {
        id: child.id,
        name: child.name,
        birth_date: child.birth_date,
        profile_image: child.profile_image,
        created_at: child.created_at,
        total_points: balance.total_points,
        reserved_points: balance.reserved_points,
        available_points: balance.available_points,
    }
}

fn transaction_view(tx: engine::PointTransaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: match tx.kind {
            engine::TransactionKind::Earn => TransactionKind::Earn,
            engine::TransactionKind::Spend => TransactionKind::Spend,
        },
        points: tx.points,
        reason: tx.reason,
        message: tx.message,
        created_at: tx.created_at,
    }
}

fn category_view(category: engine::RewardCategory) -> RewardCategory {
    match category {
        engine::RewardCategory::Toy => RewardCategory::Toy,
        engine::RewardCategory::Snack => RewardCategory::Snack,
        engine::RewardCategory::Experience => RewardCategory::Experience,
        engine::RewardCategory::Money => RewardCategory::Money,
        engine::RewardCategory::Other => RewardCategory::Other,
    }
}

/// Handle `GET /children`
pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<ChildrenResponse>, ServerError> {
    let children = state.engine.list_children(&actor).await?;
    Ok(Json(ChildrenResponse {
        children: children.into_iter().map(profile_view).collect(),
    }))
}

/// Handle `GET /children/{id}`
pub async fn profile(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(child_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<ChildProfile>, ServerError> {
    let profile = state.engine.child_profile(&actor, child_id).await?;
    Ok(Json(profile_view(profile)))
}

/// Handle `GET /children/{id}/balance`
pub async fn balance(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(child_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<Balance>, ServerError> {
    let balance = state.engine.balance(&actor, child_id).await?;
    Ok(Json(balance_view(balance)))
}

/// Handle `GET /children/{id}/history`
pub async fn history(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(child_id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, ServerError>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let (transactions, next_cursor) = state
        .engine
        .history(
            &actor,
            child_id,
            query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            query.cursor.as_deref(),
        )
        .await?;

    Ok(Json(HistoryResponse {
        transactions: transactions.into_iter().map(transaction_view).collect(),
        next_cursor,
    }))
}

/// Handle `GET /children/{id}/rewards`
pub async fn rewards(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(child_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<RewardsResponse>, ServerError> {
    let offers = state.engine.available_rewards(&actor, child_id).await?;
    Ok(Json(RewardsResponse {
        rewards: offers
            .into_iter()
            .map(|offer| RewardOffer {
                id: offer.reward.id,
                name: offer.reward.name,
                description: offer.reward.description,
                required_points: offer.reward.required_points,
                category: category_view(offer.reward.category),
                image_url: offer.reward.image_url,
                affordable: offer.affordable,
            })
            .collect(),
    }))
}
