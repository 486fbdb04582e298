//! Lifetime scope for the backend calls made while rendering one view.
//!
//! A scope is a child of the server's shutdown token. Dropping the scope
//! (the handler future was dropped because the client went away) or shutting
//! the server down cancels it, and any call still running inside it resolves
//! to [`GatewayError::Cancelled`] instead of delivering a stale result.

use std::future::Future;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::gateway::GatewayError;

pub struct ViewScope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl ViewScope {
    pub fn child_of(parent: &CancellationToken) -> Self {
        let token = parent.child_token();
        let guard = token.clone().drop_guard();
        Self {
            token,
            _guard: guard,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `call` unless the scope is cancelled first.
    pub async fn run<T, F>(&self, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!("View scope cancelled, discarding pending result");
                Err(GatewayError::Cancelled)
            }
            result = call => result,
        }
    }
}
