//! Purchase workflow endpoints.

use api_types::purchases::{
    PurchaseListQuery, PurchaseNew, PurchaseStatus, PurchaseStatusResponse, PurchaseView,
    PurchasesResponse, StatusFilter,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Actor, Purchase, PurchaseListFilter};

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::PurchaseStatus) -> PurchaseStatus {
    match status {
        engine::PurchaseStatus::Pending => PurchaseStatus::Pending,
        engine::PurchaseStatus::Approved => PurchaseStatus::Approved,
        engine::PurchaseStatus::Rejected => PurchaseStatus::Rejected,
        engine::PurchaseStatus::Cancelled => PurchaseStatus::Cancelled,
    }
}

fn status_filter(filter: StatusFilter) -> Option<engine::PurchaseStatus> {
    match filter {
        StatusFilter::All => None,
        StatusFilter::Pending => Some(engine::PurchaseStatus::Pending),
        StatusFilter::Approved => Some(engine::PurchaseStatus::Approved),
        StatusFilter::Rejected => Some(engine::PurchaseStatus::Rejected),
        StatusFilter::Cancelled => Some(engine::PurchaseStatus::Cancelled),
    }
}

fn status_response(purchase: &Purchase) -> Json<PurchaseStatusResponse> {
    Json(PurchaseStatusResponse {
        purchase_id: purchase.id,
        status: status_view(purchase.status),
    })
}

/// Handle `POST /purchases`
pub async fn request(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PurchaseNew>, ServerError>,
) -> Result<(StatusCode, Json<PurchaseStatusResponse>), ServerError> {
    let purchase = state
        .engine
        .request_purchase(&actor, payload.child_id, payload.reward_id)
        .await?;
    Ok((StatusCode::CREATED, status_response(&purchase)))
}

/// Handle `POST /purchases/{id}/approve`
pub async fn approve(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(purchase_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<PurchaseStatusResponse>, ServerError> {
    let purchase = state.engine.approve_purchase(&actor, purchase_id).await?;
    Ok(status_response(&purchase))
}

/// Handle `POST /purchases/{id}/reject`
pub async fn reject(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(purchase_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<PurchaseStatusResponse>, ServerError> {
    let purchase = state.engine.reject_purchase(&actor, purchase_id).await?;
    Ok(status_response(&purchase))
}

/// Handle `DELETE /purchases/{id}`
pub async fn cancel(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(purchase_id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<PurchaseStatusResponse>, ServerError> {
    let purchase = state.engine.cancel_purchase(&actor, purchase_id).await?;
    Ok(status_response(&purchase))
}

/// Handle `GET /purchases`
pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<PurchaseListQuery>, ServerError>,
) -> Result<Json<PurchasesResponse>, ServerError> {
    let filter = PurchaseListFilter {
        status: status_filter(query.status),
        child_id: query.child_id,
    };
    let purchases = state.engine.list_purchases(&actor, &filter).await?;

    Ok(Json(PurchasesResponse {
        purchases: purchases
            .into_iter()
            .map(|p| PurchaseView {
                id: p.id,
                child_id: p.child_id,
                reward_id: p.reward_id,
                reward_name: p.reward_name,
                cost_points: p.cost_points,
                status: status_view(p.status),
                requested_at: p.requested_at,
                decided_at: p.decided_at,
            })
            .collect(),
    }))
}
