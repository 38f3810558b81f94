//! HTTP request handlers.

use super::render::*;
use super::session::{expired_session_cookie, password_matches, session_cookie, session_token};
use super::AppState;
use crate::monitor::{aggregate, aggregate_with_progress, AggregationResult};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use rust_embed::RustEmbed;
use serde::Deserialize;

// ============================================================================
// Templates
// ============================================================================

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const DASHBOARD_TEMPLATE: &str = include_str!("templates/dashboard.html");
const DEBUG_TEMPLATE: &str = include_str!("templates/debug.html");
const LOGIN_TEMPLATE: &str = include_str!("templates/login.html");

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

fn page(title: &str, content: &str) -> Html<String> {
    Html(fill_template(LAYOUT_TEMPLATE, &[("title", title), ("content", content)]))
}

fn dashboard_content(result: &AggregationResult, view: ViewMode) -> String {
    let overall = render_overall(result);
    let legend = render_legend();
    let view_toggle = render_view_toggle(view);
    let services = render_services(result, view);
    let lag_progress = render_lag_progress(result);
    let lag_table = render_lag_table(&result.lag_entries);
    let polled_at = result.polled_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    fill_template(
        DASHBOARD_TEMPLATE,
        &[
            ("overall", overall.as_str()),
            ("legend", legend.as_str()),
            ("view_toggle", view_toggle.as_str()),
            ("services", services.as_str()),
            ("lag_progress", lag_progress.as_str()),
            ("lag_table", lag_table.as_str()),
            ("polled_at", polled_at.as_str()),
        ],
    )
}

fn debug_content(result: &AggregationResult) -> String {
    let primary_json = render_primary_debug(result);
    let diagnostics_json = render_diagnostics_debug(result);

    fill_template(
        DEBUG_TEMPLATE,
        &[
            ("primary_json", primary_json.as_str()),
            ("diagnostics_json", diagnostics_json.as_str()),
        ],
    )
}

// ============================================================================
// Session gate
// ============================================================================

/// Whether the request may see monitor data. Always true when no password is configured.
async fn is_authorized(state: &AppState, headers: &HeaderMap) -> bool {
    if state.config.password.is_none() {
        return true;
    }
    match session_token(headers) {
        Some(token) => state.sessions.is_valid(&token).await,
        None => false,
    }
}

async fn poll(state: &AppState) -> AggregationResult {
    aggregate_with_progress(&*state.source, state.config.endpoint_count, |done, total| {
        tracing::debug!("Polled lag endpoint {}/{}", done, total);
    })
    .await
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub view: Option<ViewMode>,
}

pub async fn handle_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response {
    if !is_authorized(&state, &headers).await {
        return Redirect::to("/login").into_response();
    }

    let view = query.view.unwrap_or_default();
    let result = poll(&state).await;

    page("Heartz Monitor Dashboard", &dashboard_content(&result, view)).into_response()
}

pub async fn handle_debug(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_authorized(&state, &headers).await {
        return Redirect::to("/login").into_response();
    }

    let result = poll(&state).await;

    page("Heartz Monitor Debug", &debug_content(&result)).into_response()
}

// ============================================================================
// API
// ============================================================================

pub async fn handle_api_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_authorized(&state, &headers).await {
        return (StatusCode::UNAUTHORIZED, "Login required").into_response();
    }

    Json(aggregate(&*state.source, state.config.endpoint_count).await).into_response()
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

fn login_page(error: Option<&str>) -> Html<String> {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>", escape_html(e)))
        .unwrap_or_default();
    page("Please Enter Password", &fill_template(LOGIN_TEMPLATE, &[("error", error_html.as_str())]))
}

pub async fn handle_login_page(State(state): State<AppState>) -> Response {
    if state.config.password.is_none() {
        return Redirect::to("/").into_response();
    }
    login_page(None).into_response()
}

pub async fn handle_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let Some(expected) = state.config.password.as_deref() else {
        return Redirect::to("/").into_response();
    };

    if !password_matches(expected, &form.password) {
        tracing::warn!("Rejected dashboard login attempt");
        return (StatusCode::UNAUTHORIZED, login_page(Some("Incorrect password!"))).into_response();
    }

    let token = state.sessions.create().await;
    tracing::info!("Dashboard session started");
    (
        [(header::SET_COOKIE, session_cookie(&token))],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_static(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(file) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                file.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn handle_favicon() -> impl IntoResponse {
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <circle cx="50" cy="50" r="45" fill="#0072B2"/>
        <path d="M15 55 L35 55 L45 30 L55 75 L65 50 L85 50" stroke="white" stroke-width="6" fill="none"/>
    </svg>"##;

    ([(header::CONTENT_TYPE, "image/svg+xml")], svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::fetch::HttpSource;
    use crate::monitor::{normalize_service, LagRecord, LagValue, StatusTier};
    use crate::web::SessionStore;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    /// State whose endpoints refuse connections, so every fetch fails fast.
    fn test_state(password: Option<&str>) -> AppState {
        let config = MonitorConfig {
            monitor_url: "http://127.0.0.1:1/monitor".to_string(),
            lag_base_url: "http://127.0.0.1:1/lag/".to_string(),
            endpoint_count: 2,
            password: password.map(str::to_string),
            ..MonitorConfig::default()
        };
        let source = HttpSource::new(
            &config.monitor_url,
            &config.lag_base_url,
            Some(Duration::from_millis(500)),
        )
        .unwrap();
        AppState {
            config,
            source: Arc::new(source),
            sessions: SessionStore::new(),
        }
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("heartz_session={}", token)).unwrap(),
        );
        headers
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn default_query() -> Query<DashboardQuery> {
        Query(DashboardQuery { view: None })
    }

    #[tokio::test]
    async fn test_gate_redirects_without_session() {
        let state = test_state(Some("hunter2"));

        let response = handle_dashboard(State(state.clone()), HeaderMap::new(), default_query()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = handle_debug(State(state.clone()), cookie_headers("forged")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = handle_api_status(State(state), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let state = test_state(Some("hunter2"));
        let response = handle_login(
            State(state.clone()),
            Form(LoginForm { password: "hunter3".to_string() }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Incorrect password!"));
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_login_session_and_logout() {
        let state = test_state(Some("hunter2"));

        let response = handle_login_page(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handle_login(
            State(state.clone()),
            Form(LoginForm { password: "hunter2".to_string() }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("heartz_session="));
        let token = session_token(&{
            let mut h = HeaderMap::new();
            h.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
            h
        })
        .unwrap();
        assert!(state.sessions.is_valid(&token).await);

        let response = handle_dashboard(State(state.clone()), cookie_headers(&token), default_query()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handle_api_status(State(state.clone()), cookie_headers(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handle_logout(State(state.clone()), cookie_headers(&token)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert!(response.headers()[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
        assert!(!state.sessions.is_valid(&token).await);
    }

    #[tokio::test]
    async fn test_open_dashboard_skips_gate() {
        let state = test_state(None);

        let response = handle_login_page(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let response = handle_dashboard(State(state.clone()), HeaderMap::new(), default_query()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handle_api_status(State(state), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["primary_fetch_failed"], true);
        assert_eq!(body["lag_entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_renders_lag_after_primary_failure() {
        let state = test_state(None);
        let response = handle_dashboard(State(state), HeaderMap::new(), default_query()).await;
        let body = body_text(response).await;

        assert!(body.contains("Failed to fetch monitor data. Please try again later."));
        assert!(body.contains("<td>1</td><td>Endpoint 1</td><td>Error</td>"));
        assert!(body.contains("<td>2</td><td>Endpoint 2</td><td>Error</td>"));
        assert!(body.contains("0/2 endpoints responded"));
    }

    fn placeholder_result() -> AggregationResult {
        AggregationResult {
            overall_status: "{{overall}}".to_string(),
            overall_tier: StatusTier::Unknown,
            timestamp: Some("{{polled_at}}".to_string()),
            services: vec![normalize_service(&json!({
                "name": "{{lag_table}}",
                "status": "up",
                "description": "{{services}}",
                "tags": ["{{legend}}"]
            }))],
            lag_entries: vec![LagRecord {
                endpoint_index: 1,
                topic: "{{content}}".to_string(),
                lag: LagValue::Reported(json!("{{title}}")),
                succeeded: true,
            }],
            diagnostics: vec![],
            primary_fetch_failed: false,
            primary_raw: Some(json!({"timestamp": "{{diagnostics_json}}"})),
            primary_error: None,
            polled_at: Utc::now(),
        }
    }

    #[test]
    fn test_placeholder_text_in_remote_data_stays_literal() {
        let result = placeholder_result();

        for view in [ViewMode::Table, ViewMode::Card] {
            let Html(body) = page("Heartz Monitor Dashboard", &dashboard_content(&result, view));
            assert!(body.contains("Last Updated: {{polled_at}}"));
            assert!(body.contains("{{lag_table}}"));
            assert!(body.contains("{{services}}"));
            assert!(body.contains("{{legend}}"));
            assert!(body.contains("<td>{{content}}</td><td>{{title}}</td>"));
            assert!(body.contains("{{OVERALL}}"));
            assert_eq!(body.matches("<th>Topic</th>").count(), 1);
            assert!(body.contains("<title>Heartz Monitor Dashboard</title>"));
        }

        let Html(body) = page("Heartz Monitor Debug", &debug_content(&result));
        assert!(body.contains("&quot;{{diagnostics_json}}&quot;"));
        assert!(body.contains("[]"));
    }

    #[test]
    fn test_templates_have_placeholders() {
        assert!(LAYOUT_TEMPLATE.contains("{{content}}"));
        for placeholder in ["{{overall}}", "{{services}}", "{{lag_progress}}", "{{lag_table}}", "{{legend}}"] {
            assert!(DASHBOARD_TEMPLATE.contains(placeholder), "missing {}", placeholder);
        }
        assert!(DEBUG_TEMPLATE.contains("{{diagnostics_json}}"));
        assert!(LOGIN_TEMPLATE.contains("{{error}}"));
    }

    #[test]
    fn test_login_page_escapes_error() {
        let Html(body) = login_page(Some("<nope>"));
        assert!(body.contains("&lt;nope&gt;"));
    }

    #[test]
    fn test_stylesheet_embedded() {
        assert!(Assets::get("style.css").is_some());
    }
}
