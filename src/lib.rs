pub mod api;
pub mod config;
pub mod gateway;
pub mod login;
pub mod models;
pub mod session;
pub mod ui;
pub mod views;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use axum::{middleware, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use config::Config;
use gateway::Gateways;
use login::LoginGate;
use views::ViewScope;

pub struct AppState {
    pub config: Config,
    pub gateways: Gateways,
    /// E-mails with a sign-in currently in flight
    pub login_gate: LoginGate,
    /// Root of every view scope; cancelled on shutdown
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let gateways = Gateways::from_config(&config.backends)?;
        Ok(Self {
            config,
            gateways,
            login_gate: LoginGate::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Scope for the backend calls of one view render.
    pub fn view_scope(&self) -> ViewScope {
        ViewScope::child_of(&self.shutdown)
    }

    pub fn page_size(&self) -> usize {
        self.config.views.page_size
    }
}

/// The full application: pages, local JSON routes and the role guard in
/// front of both.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(ui::create_router())
        .merge(api::create_router())
        .with_state(state)
        .layer(middleware::from_fn(session::guard::route_guard))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
