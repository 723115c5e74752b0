use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::handlers::{agents, analyze, decisions, hunt, metrics, scholarships, thoughts};
use super::ws;

fn build_localhost_cors(api_port: u16) -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", api_port),
        format!("http://localhost:{}", api_port),
    ]
    .iter()
    .filter_map(|o| o.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState, api_port: u16) -> Router {
    Router::new()
        .route("/api/agents", get(agents::get_agents))
        .route("/api/agents/statistics", get(agents::get_agent_statistics))
        .route("/api/agents/{agent_id}", get(agents::get_agent_detail))
        .route("/api/thoughts", get(thoughts::get_thoughts))
        .route(
            "/api/decisions",
            get(decisions::get_decisions).post(decisions::create_decision),
        )
        .route("/api/analyze", post(analyze::analyze_content))
        .route("/api/metrics", get(metrics::get_metrics))
        .route("/api/scholarships", get(scholarships::get_scholarships))
        .route(
            "/api/scholarships/statistics",
            get(scholarships::get_scholarship_statistics),
        )
        .route("/api/hunt/start", post(hunt::start_hunt))
        .route("/api/hunt/stop", post(hunt::stop_hunt))
        .route("/api/hunt/status", get(hunt::hunt_status))
        .route("/api/logs", get(super::sse_logs_endpoint))
        .route("/ws/dashboard", get(ws::dashboard_ws))
        .layer(middleware::from_fn(security_headers))
        .layer(build_localhost_cors(api_port))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
