//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthService, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{chat, emoji_custom, engagement, health, rooms, teams, users};
use crate::core::CoreApp;
use crate::core::config::PaginationConfig;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::TransactionalService;
use crate::domain::{EngagementService, TeamService};

/// Services the HTTP routes are built from
#[derive(Clone)]
pub struct ApiServices {
    pub database: Arc<TransactionalService>,
    pub auth_manager: Arc<AuthManager>,
    pub teams: Arc<TeamService>,
    pub engagement: Arc<EngagementService>,
    pub pagination: PaginationConfig,
}

impl ApiServices {
    fn from_app(app: &CoreApp) -> Self {
        Self {
            database: app.database.clone(),
            auth_manager: app.auth.clone(),
            teams: app.teams.clone(),
            engagement: app.engagement.clone(),
            pagination: app.config.pagination,
        }
    }
}

/// Build every route: `/api/v1` behind `require_auth` (except health),
/// plus the OpenAPI document and Swagger UI
pub fn api_router(services: ApiServices) -> Router<()> {
    let ApiServices {
        database,
        auth_manager,
        teams,
        engagement,
        pagination,
    } = services;

    // One AuthService per router so the permission cache is shared
    let auth_state = AuthState {
        auth_manager,
        auth_service: Arc::new(AuthService::new(database.clone())),
        engagement: engagement.clone(),
    };

    let authenticated = Router::new()
        .merge(teams::routes(teams, pagination))
        .merge(emoji_custom::routes(database.clone()))
        .merge(users::routes(database.clone(), engagement.clone()))
        .merge(rooms::routes(database.clone()))
        .merge(chat::routes(database.clone(), engagement.clone()))
        .nest("/engagement-dashboard", engagement::routes(engagement))
        .layer(axum::middleware::from_fn_with_state(auth_state, require_auth));

    let v1 = Router::new()
        .route("/health", get(health::health).with_state(database))
        .merge(authenticated);

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api/v1", v1)
        .fallback(middleware::handle_404)
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = api_router(ApiServices::from_app(&app))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP server listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
