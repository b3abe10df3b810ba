use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{children, identity, points, purchases};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let actor = identity::resolve(&state.db, credentials.username(), credentials.password())
        .await
        .map_err(|err| {
            tracing::error!("identity lookup failed: {err}");
            StatusCode::UNAUTHORIZED
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/points/award", post(points::award))
        .route("/points/deduct", post(points::deduct))
        .route("/children", get(children::list))
        .route("/children/{id}", get(children::profile))
        .route("/children/{id}/balance", get(children::balance))
        .route("/children/{id}/history", get(children::history))
        .route("/children/{id}/rewards", get(children::rewards))
        .route(
            "/purchases",
            post(purchases::request).get(purchases::list),
        )
        .route(
            "/purchases/{id}",
            axum::routing::delete(purchases::cancel),
        )
        .route("/purchases/{id}/approve", post(purchases::approve))
        .route("/purchases/{id}/reject", post(purchases::reject))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
