//! Award and deduct endpoints.

use api_types::points::PointsBatch;
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::{Actor, PointsCmd};

use crate::{ServerError, server::ServerState};

fn command(payload: PointsBatch) -> PointsCmd {
    let mut cmd = PointsCmd::new(payload.child_ids, payload.points);
    if let Some(reason) = payload.reason {
        cmd = cmd.reason(reason);
    }
    if let Some(message) = payload.message {
        cmd = cmd.message(message);
    }
    cmd
}

/// Handle `POST /points/award`
pub async fn award(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PointsBatch>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.award(&actor, command(payload)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle `POST /points/deduct`
pub async fn deduct(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PointsBatch>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.deduct(&actor, command(payload)).await?;
    Ok(StatusCode::NO_CONTENT)
}
