use api_types::ErrorCode;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod children;
mod identity;
mod points;
mod purchases;
mod server;

pub mod types {
    pub mod points {
        pub use api_types::points::{
            Balance, HistoryQuery, HistoryResponse, PointsBatch, TransactionKind, TransactionView,
        };
    }

    pub mod children {
        pub use api_types::children::{ChildProfile, ChildrenResponse};
    }

    pub mod rewards {
        pub use api_types::rewards::{RewardCategory, RewardOffer, RewardsResponse};
    }

    pub mod purchases {
        pub use api_types::purchases::{
            PurchaseListQuery, PurchaseNew, PurchaseStatus, PurchaseStatusResponse, PurchaseView,
            PurchasesResponse, StatusFilter,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// Malformed path, query or body.
    Request(String),
}

fn status_for_engine_error(err: &EngineError) -> (StatusCode, ErrorCode) {
    match err {
        EngineError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ValidationError),
        EngineError::InsufficientPoints { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InsufficientPoints,
        ),
        EngineError::RewardNotAvailable(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::RewardNotAvailable,
        ),
        EngineError::InvalidState(_) => (StatusCode::CONFLICT, ErrorCode::InvalidState),
        EngineError::UnknownChild(_) => (StatusCode::NOT_FOUND, ErrorCode::UnknownChild),
        EngineError::KeyNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        EngineError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
        EngineError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
        EngineError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal),
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, error) = match self {
            ServerError::Engine(err) => {
                let (status, code) = status_for_engine_error(&err);
                (status, code, message_for_engine_error(err))
            }
            ServerError::Request(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ValidationError,
                err,
            ),
        };

        (status, Json(api_types::Error { error, code })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Request(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Request(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Request(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = ServerError::from(EngineError::UnknownChild(vec![3])).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_state_and_conflict_map_to_409() {
        let res = ServerError::from(EngineError::InvalidState("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn business_refusals_map_to_422() {
        for err in [
            EngineError::Validation("x".to_string()),
            EngineError::RewardNotAvailable("x".to_string()),
            EngineError::InsufficientPoints {
                required: 5,
                available: 1,
            },
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_errors_are_opaque() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(status_for_engine_error(&err).1, ErrorCode::Internal);
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn malformed_request_maps_to_422() {
        let res = ServerError::Request("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
