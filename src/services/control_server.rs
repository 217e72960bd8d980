//! HTTP поверхность управления: активация, остановка и загрузка кадров.
//!
//! Каждая сессия загрузки владеет собственным состоянием дебаунсера, общие
//! только флаг активации и исполнитель действий.

use crate::error::{GestureError, Result};
use crate::events::{FrameMessage, GestureStatus};
use crate::services::gesture_controller::{GestureController, StreamState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

struct SessionEntry {
    epoch: u64,
    stream: StreamState,
    /// Порядковый номер последнего кадра сессии
    last_seen: u64,
}

pub struct ControlState {
    controller: Arc<GestureController>,
    sessions: DashMap<String, SessionEntry>,
    requests: AtomicU64,
    max_sessions: usize,
}

impl ControlState {
    pub fn new(controller: Arc<GestureController>) -> Self {
        let max_sessions = controller.config().server.max_sessions.max(1);
        Self {
            controller,
            sessions: DashMap::new(),
            requests: AtomicU64::new(0),
            max_sessions,
        }
    }

    /// Освободить место под новую сессию, вытесняя самые давние
    fn make_room(&self, session: &str) {
        if self.sessions.contains_key(session) {
            return;
        }

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_seen)
                .map(|entry| entry.key().clone());

            let Some(oldest) = oldest else { break };
            self.sessions.remove(&oldest);
            info!("Сессия '{}' вытеснена: достигнут предел {} сессий", oldest, self.max_sessions);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub active: bool,
    pub sessions: usize,
}

/// Кадр, загруженный клиентом
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default = "default_session")]
    pub session: String,
    /// Монотонное время клиента; без него используется время с начала сессии
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(flatten)]
    pub frame: FrameMessage,
}

fn default_session() -> String {
    "default".to_string()
}

impl IntoResponse for GestureError {
    fn into_response(self) -> Response {
        let status = match &self {
            GestureError::InvalidObservation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GestureError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "status": "error", "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub fn router(state: Arc<ControlState>) -> Router {
    Router::new()
        .route("/get-started", post(get_started))
        .route("/stop-gesture", post(stop_gesture))
        .route("/status", get(status))
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(controller: Arc<GestureController>, addr: SocketAddr) -> Result<()> {
    let app = router(Arc::new(ControlState::new(controller)));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        GestureError::ServiceUnavailable(format!("Не удалось открыть {}: {}", addr, e))
    })?;

    info!("HTTP сервер управления слушает {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_started(State(state): State<Arc<ControlState>>) -> Json<ControlResponse> {
    let status = if state.controller.activation().activate() {
        "started"
    } else {
        "already_running"
    };
    Json(ControlResponse { status })
}

async fn stop_gesture(State(state): State<Arc<ControlState>>) -> Json<ControlResponse> {
    let status = if state.controller.activation().deactivate() {
        let dropped = state.sessions.len();
        state.sessions.clear();
        info!("Сброшено {} сессий загрузки", dropped);
        "stopped"
    } else {
        "not_running"
    };
    Json(ControlResponse { status })
}

async fn status(State(state): State<Arc<ControlState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        active: state.controller.activation().is_active(),
        sessions: state.sessions.len(),
    })
}

async fn predict(
    State(state): State<Arc<ControlState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<GestureStatus>> {
    let controller = &state.controller;
    let activation = controller.activation();

    // Неактивный режим: ядро не вызывается вообще
    if !activation.is_active() {
        return Ok(Json(GestureStatus::Inactive));
    }

    let config = controller.config();
    let Some(hand) = request.frame.best_hand(config.source.min_confidence) else {
        return Ok(Json(GestureStatus::Idle));
    };

    let epoch = activation.epoch();
    let seen = state.requests.fetch_add(1, Ordering::Relaxed);
    state.make_room(&request.session);

    let mut entry = state
        .sessions
        .entry(request.session.clone())
        .or_try_insert_with(|| {
            info!("Новая сессия загрузки '{}'", request.session);
            controller.new_stream().map(|stream| SessionEntry {
                epoch,
                stream,
                last_seen: seen,
            })
        })?;

    // Сессия пережила перезапуск: начинаем с чистого состояния
    if entry.epoch != epoch {
        entry.epoch = epoch;
        entry.stream = controller.new_stream()?;
    }
    entry.last_seen = seen;

    let timestamp = request
        .timestamp_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| entry.stream.elapsed());

    let execute = config.server.execute_actions;
    let result = controller.process_hand(&mut entry.stream, &hand, timestamp, execute);

    if let Err(GestureError::InvalidObservation(reason)) = &result {
        warn!("Сессия '{}': кадр отклонён: {}", request.session, reason);
    }

    Ok(Json(result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::hand::fixtures::{hand_message, neutral_hand};
    use crate::events::hand::landmarks;
    use crate::events::{GestureLabel, Handedness, InputAction, Landmark, MouseButton};
    use crate::services::virtual_device::fixtures::RecordingExecutor;
    use crate::services::ActivationFlag;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<RecordingExecutor>) {
        app_with(Config::default())
    }

    fn app_with(config: Config) -> (Router, Arc<RecordingExecutor>) {
        let recorder = Arc::new(RecordingExecutor::default());
        let controller = GestureController::new(
            Arc::new(config),
            recorder.clone(),
            Arc::new(ActivationFlag::new(false)),
            true,
        )
        .unwrap();
        let state = Arc::new(ControlState::new(Arc::new(controller)));
        (router(state), recorder)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn click_frame(session: &str, timestamp_ms: u64) -> Value {
        let mut hand = neutral_hand(Handedness::Right);
        hand.landmarks[landmarks::THUMB_TIP] = Landmark::new(0.45, 0.49);
        json!({
            "session": session,
            "timestamp_ms": timestamp_ms,
            "hands": [hand_message(&hand)],
        })
    }

    #[tokio::test]
    async fn test_activation_lifecycle() {
        let (app, _) = app();

        let (_, body) = call(&app, "POST", "/stop-gesture", None).await;
        assert_eq!(body, json!({"status": "not_running"}));

        let (_, body) = call(&app, "POST", "/get-started", None).await;
        assert_eq!(body, json!({"status": "started"}));

        let (_, body) = call(&app, "POST", "/get-started", None).await;
        assert_eq!(body, json!({"status": "already_running"}));

        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["active"], json!(true));

        let (_, body) = call(&app, "POST", "/stop-gesture", None).await;
        assert_eq!(body, json!({"status": "stopped"}));
    }

    #[tokio::test]
    async fn test_predict_inactive_skips_core() {
        let (app, recorder) = app();

        let (status, body) = call(&app, "POST", "/predict", Some(click_frame("a", 0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "inactive"}));
        assert!(recorder.actions().is_empty());
        assert!(recorder.cursor().is_empty());
    }

    #[tokio::test]
    async fn test_predict_debounces_per_session() {
        let (app, recorder) = app();
        call(&app, "POST", "/get-started", None).await;

        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("a", 0))).await;
        assert_eq!(body, json!({"status": "action", "action": "click"}));

        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("a", 500))).await;
        assert_eq!(body, json!({"status": "cooldown"}));

        // Другая сессия не делит состояние с первой
        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("b", 500))).await;
        assert_eq!(body, json!({"status": "action", "action": "click"}));

        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("a", 900))).await;
        assert_eq!(body, json!({"status": "action", "action": "click"}));

        assert_eq!(recorder.actions(), vec![InputAction::Click(MouseButton::Left); 3]);

        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["sessions"], json!(2));
    }

    #[tokio::test]
    async fn test_predict_rejects_time_going_backwards() {
        let (app, _) = app();
        call(&app, "POST", "/get-started", None).await;

        call(&app, "POST", "/predict", Some(click_frame("a", 5_000))).await;
        let (status, body) = call(&app, "POST", "/predict", Some(click_frame("a", 1_000))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], json!("error"));
    }

    #[tokio::test]
    async fn test_predict_without_hand_is_idle() {
        let (app, _) = app();
        call(&app, "POST", "/get-started", None).await;

        let (status, body) = call(&app, "POST", "/predict", Some(json!({"hands": []}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "idle"}));
    }

    #[tokio::test]
    async fn test_restart_resets_sessions() {
        let (app, _) = app();
        call(&app, "POST", "/get-started", None).await;
        call(&app, "POST", "/predict", Some(click_frame("a", 5_000))).await;

        call(&app, "POST", "/stop-gesture", None).await;
        call(&app, "POST", "/get-started", None).await;

        // После перезапуска время сессии начинается заново
        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("a", 0))).await;
        assert_eq!(body, json!({"status": "action", "action": GestureLabel::Click}));
    }

    #[tokio::test]
    async fn test_session_count_is_capped() {
        let mut config = Config::default();
        config.server.max_sessions = 2;
        let (app, _) = app_with(config);
        call(&app, "POST", "/get-started", None).await;

        call(&app, "POST", "/predict", Some(click_frame("a", 0))).await;
        call(&app, "POST", "/predict", Some(click_frame("b", 0))).await;
        // "b" обновлена позже "a", поэтому вытесняется "a"
        call(&app, "POST", "/predict", Some(click_frame("b", 100))).await;
        call(&app, "POST", "/predict", Some(click_frame("c", 0))).await;

        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["sessions"], json!(2));

        // "b" сохранила период удержания
        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("b", 500))).await;
        assert_eq!(body, json!({"status": "cooldown"}));

        // "a" начинает с чистого дебаунсера
        let (_, body) = call(&app, "POST", "/predict", Some(click_frame("a", 500))).await;
        assert_eq!(body, json!({"status": "action", "action": "click"}));

        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["sessions"], json!(2));
    }
}
