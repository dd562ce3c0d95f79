use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failure detected, failing fast
    HalfOpen, // Testing if service is back
}

/// Fails fast once a downstream dependency keeps answering with server errors.
pub struct CircuitBreaker {
    pub name: String,
    pub state: RwLock<CircuitState>,
    pub failure_count: AtomicUsize,
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
    pub last_failure: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: &str, threshold: usize, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            failure_threshold: threshold.max(1),
            reset_timeout: timeout,
            last_failure: RwLock::new(None),
        }
    }

    pub async fn current_state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Whether a request may go through right now.
    pub async fn check(&self) -> bool {
        let state = *self.state.read().await;
        if state != CircuitState::Open {
            return true;
        }

        let last_fail = *self.last_failure.read().await;
        match last_fail {
            Some(instant) if instant.elapsed() > self.reset_timeout => {
                let mut s = self.state.write().await;
                if *s == CircuitState::Open {
                    *s = CircuitState::HalfOpen;
                    tracing::info!("Circuit Breaker [{}] moving to Half-Open", self.name);
                }
                true
            }
            _ => false,
        }
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        if *state == CircuitState::HalfOpen {
            tracing::info!("Circuit Breaker [{}] recovered to Closed", self.name);
        }
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
    }

    pub async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write().await;

        if count >= self.failure_threshold || *state == CircuitState::HalfOpen {
            *state = CircuitState::Open;
            *self.last_failure.write().await = Some(Instant::now());
            tracing::error!("Circuit Breaker [{}] TRIPPED to Open. Failures: {}", self.name, count);
        }
    }
}

/// Guards the place-order route: gateway failures surface as 5xx responses.
pub async fn payment_circuit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let cb = &state.resiliency.payment_cb;

    if !cb.check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": format!("Circuit Breaker [{}] is OPEN", cb.name) })),
        )
            .into_response();
    }

    let response = next.run(req).await;

    if response.status().is_server_error() {
        cb.record_failure().await;
    } else {
        cb.record_success().await;
    }

    response
}
