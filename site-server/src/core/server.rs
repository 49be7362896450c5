//! Server Implementation
//!
//! HTTP 服务器启动和管理

use axum::{Router, middleware};
use http::HeaderValue;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::require_auth;
use crate::core::{Config, Result, ServerError, ServerState};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::settings::router())
        .merge(crate::api::upload::router())
}

/// 完整路由 (状态 + 中间件)
///
/// 认证中间件在 Router 级别应用，require_auth 内部跳过公共路由。
pub fn build_router(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);

    build_app()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config
        .cors_allow_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Site server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Io)?;

        Ok(())
    }
}
