use crate::article::Topic;
use crate::error::ReaderError;
use crate::reader::Reader;
use crate::render::{InfoRow, Layout, RelatedLink, related_links, topic_href};
use crate::theme::Theme;
use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use include_dir::{Dir, include_dir};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

pub struct AppState {
    pub reader: Arc<Reader>,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

pub async fn serve(reader: Reader, config: WebConfig) -> Result<(), ReaderError> {
    let state = Arc::new(AppState {
        reader: Arc::new(reader),
    });
    let router = build_router(state);
    info!(%config.addr, "Binding HTTP listener");
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ReaderError> for ApiError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            ReaderError::InvalidTheme(_) => Self::bad_request(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/fragment", get(fragment))
        .route("/theme/toggle", post(toggle_theme_form))
        .route("/api/article", get(api_article))
        .route("/api/related", get(api_related))
        .route("/api/theme", get(api_theme).put(api_set_theme))
        .route("/api/theme/toggle", post(api_toggle_theme))
        .route("/static/:file", get(static_asset))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[derive(Debug, Deserialize)]
struct TopicParams {
    topic: Option<String>,
}

impl TopicParams {
    fn topic(&self) -> Option<Topic> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .map(Topic::from)
    }

    fn require(&self) -> Result<Topic, ApiError> {
        self.topic()
            .ok_or_else(|| ApiError::bad_request("Query parameter `topic` is required"))
    }
}

async fn home(State(state): State<SharedState>, Query(params): Query<TopicParams>) -> Response {
    let theme = state.reader.themes().get();
    let displayed = match params.topic() {
        Some(topic) => match state.reader.load(topic).await {
            Ok(outcome) => Some(outcome.into_article()),
            Err(err) => {
                warn!(error = %err, "failed to render article");
                return render_error_page(theme, &err.to_string());
            }
        },
        None => state.reader.current(),
    };
    match state.reader.render_page_for(displayed.as_ref()) {
        Ok(page) => Html(page).into_response(),
        Err(err) => render_error_page(theme, &err.to_string()),
    }
}

/// Content region only, for in-place swaps. A superseded load still answers
/// with its own article; the client decides whether to show it.
async fn fragment(
    State(state): State<SharedState>,
    Query(params): Query<TopicParams>,
) -> Result<Response, ApiError> {
    let topic = params.require()?;
    let displayed = state.reader.load(topic).await?.into_article();
    Ok((
        [
            ("x-load-token", displayed.token.value().to_string()),
            ("x-layout", displayed.kind.as_str().to_string()),
        ],
        Html(displayed.html),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct ThemeForm {
    topic: Option<String>,
}

async fn toggle_theme_form(
    State(state): State<SharedState>,
    Form(form): Form<ThemeForm>,
) -> Redirect {
    let theme = state.reader.themes().toggle();
    info!(%theme, "theme toggled");
    let target = form
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(topic_href)
        .unwrap_or_else(|| "/".to_string());
    Redirect::to(&target)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArticlePayload {
    topic: String,
    layout: String,
    title: String,
    description: String,
    extract: String,
    thumbnail_url: Option<String>,
    page_url: String,
    updated: Option<String>,
    content: Option<String>,
    info: Vec<InfoPayload>,
    related: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InfoPayload {
    label: String,
    value: String,
}

impl From<&InfoRow> for InfoPayload {
    fn from(row: &InfoRow) -> Self {
        Self {
            label: row.label.to_string(),
            value: row.value.clone(),
        }
    }
}

async fn api_article(
    State(state): State<SharedState>,
    Query(params): Query<TopicParams>,
) -> Result<Json<ArticlePayload>, ApiError> {
    let topic = params.require()?;
    let view = state.reader.article_view(&topic).await?;
    let layout = view.kind().as_str().to_string();
    let (content, info) = match view.layout {
        Layout::Full { body_html } => (Some(body_html), Vec::new()),
        Layout::Summary { info } => (None, info.iter().map(InfoPayload::from).collect()),
    };
    Ok(Json(ArticlePayload {
        topic: view.topic,
        layout,
        title: view.title,
        description: view.description,
        extract: view.extract,
        thumbnail_url: view.thumbnail_url,
        page_url: view.page_url,
        updated: view.updated,
        content,
        info,
        related: view.related.into_iter().map(|link| link.topic).collect(),
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RelatedPayload {
    topic: String,
    related: Vec<RelatedLink>,
}

async fn api_related(
    State(state): State<SharedState>,
    Query(params): Query<TopicParams>,
) -> Result<Json<RelatedPayload>, ApiError> {
    let topic = params.require()?;
    let related = related_links(state.reader.related().resolve(topic.as_str()));
    Ok(Json(RelatedPayload {
        topic: topic.to_string(),
        related,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThemePayload {
    theme: Theme,
    label: String,
}

impl ThemePayload {
    fn new(theme: Theme) -> Self {
        Self {
            theme,
            label: theme.switch_label().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThemeUpdate {
    theme: String,
}

async fn api_theme(State(state): State<SharedState>) -> Json<ThemePayload> {
    Json(ThemePayload::new(state.reader.themes().get()))
}

async fn api_set_theme(
    State(state): State<SharedState>,
    Json(update): Json<ThemeUpdate>,
) -> Result<Json<ThemePayload>, ApiError> {
    let theme: Theme = update.theme.parse()?;
    state.reader.themes().set(theme);
    Ok(Json(ThemePayload::new(theme)))
}

async fn api_toggle_theme(State(state): State<SharedState>) -> Json<ThemePayload> {
    Json(ThemePayload::new(state.reader.themes().toggle()))
}

async fn static_asset(Path(file): Path<String>) -> Response {
    match ASSETS.get_file(&file) {
        Some(asset) => (
            [(header::CONTENT_TYPE, asset_mime(&file).to_string())],
            asset.contents(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn asset_mime(file: &str) -> mime::Mime {
    match file.rsplit('.').next() {
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "wikireader-web" }))
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{ theme }}">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Wiki Reader • Error</title>
    <link rel="stylesheet" href="/static/reader.css">
  </head>
  <body>
    <main class="content">
      <h1>Something went wrong</h1>
      <p>{{ message }}</p>
      <a href="/" class="related-topic">Back to home</a>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ErrorPageTemplate<'a> {
    theme: Theme,
    message: &'a str,
}

fn render_error_page(theme: Theme, message: &str) -> Response {
    match (ErrorPageTemplate { theme, message }).render() {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            warn!(error = %err, "failed to render error page");
            (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
        }
    }
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use crate::related::RelatedTopics;
    use crate::sanitize::Sanitizer;
    use crate::test_utils::{ScriptedSource, summary_fixture};
    use crate::theme::ThemeStore;
    use axum::{body, body::Body, http::Request};
    use tower::ServiceExt;

    fn test_router() -> (Router, Arc<Reader>) {
        let source = ScriptedSource::new()
            .with_article(
                "Quantum Computing",
                summary_fixture("Quantum Computing"),
                r#"<p>Qubits<sup class="reference">[1]</sup></p><div class="navbox">nav</div>"#,
            )
            .with_article("Renaissance", summary_fixture("Renaissance"), "");
        let reader = Arc::new(Reader::new(
            Arc::new(source),
            Sanitizer::default(),
            RelatedTopics::curated(),
            ThemeStore::ephemeral(),
        ));
        let state = Arc::new(AppState {
            reader: reader.clone(),
        });
        (build_router(state), reader)
    }

    async fn body_text(response: Response) -> String {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn home_without_topic_shows_menu() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        let html = body_text(response).await;
        assert!(html.contains("Welcome"));
        assert_eq!(html.matches("class=\"menu-item\"").count(), 5);
        assert!(html.contains("id=\"theme-switcher\""));
    }

    #[tokio::test]
    async fn home_with_topic_renders_full_article() {
        let (router, reader) = test_router();
        let response = router
            .oneshot(
                Request::get("/?topic=Quantum%20Computing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let html = body_text(response).await;
        assert!(html.contains("data-layout=\"full\""));
        assert!(html.contains("Qubits"));
        assert!(!html.contains("navbox"));
        assert!(html.contains("class=\"menu-item active\""));
        assert_eq!(html.matches("class=\"related-topic\"").count(), 6);
        assert_eq!(reader.current().unwrap().topic, "Quantum Computing");
    }

    #[tokio::test]
    async fn fragment_reports_layout() {
        let (router, _) = test_router();
        let response = router
            .oneshot(
                Request::get("/fragment?topic=Renaissance")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()["x-layout"], "summary");
        let html = body_text(response).await;
        assert!(html.contains("Comprehensive Summary"));
        assert!(!html.contains("<html"));
    }

    #[tokio::test]
    async fn fragment_for_missing_topic_is_error_layout() {
        let (router, _) = test_router();
        let response = router
            .oneshot(
                Request::get("/fragment?topic=Lost%20City")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()["x-layout"], "not-found");
        let html = body_text(response).await;
        assert!(html.contains("Lost City"));
        assert!(html.contains("Try Again"));
    }

    #[tokio::test]
    async fn fragment_requires_topic() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::get("/fragment").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_article_returns_payload_or_404() {
        let (router, _) = test_router();
        let response = router
            .clone()
            .oneshot(
                Request::get("/api/article?topic=Renaissance")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let payload: ArticlePayload = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload.layout, "summary");
        assert!(payload.content.is_none());
        assert_eq!(payload.info.len(), 4);
        assert_eq!(payload.related.len(), 6);

        let response = router
            .oneshot(
                Request::get("/api/article?topic=Nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn api_related_falls_back_to_generic() {
        let (router, _) = test_router();
        let response = router
            .oneshot(
                Request::get("/api/related?topic=artificial%20intelligence")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let payload: RelatedPayload = serde_json::from_str(&body_text(response).await).unwrap();
        let topics: Vec<_> = payload.related.iter().map(|l| l.topic.as_str()).collect();
        assert_eq!(topics, RelatedTopics::curated().resolve("Nonexistent Topic"));
    }

    #[tokio::test]
    async fn theme_form_toggles_and_redirects() {
        let (router, reader) = test_router();
        let response = router
            .oneshot(
                Request::post("/theme/toggle")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("topic=Renaissance"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/?topic=Renaissance");
        assert_eq!(reader.themes().get(), Theme::Dark);
    }

    #[tokio::test]
    async fn api_theme_put_validates() {
        let (router, reader) = test_router();
        let response = router
            .clone()
            .oneshot(
                Request::put("/api/theme")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"theme":"dark"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
        let payload: ThemePayload = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(payload.theme, Theme::Dark);
        assert_eq!(payload.label, "☀️ Light Mode");
        assert_eq!(reader.themes().get(), Theme::Dark);

        let response = router
            .oneshot(
                Request::put("/api/theme")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"theme":"sepia"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn static_assets_are_served() {
        let (router, _) = test_router();
        let response = router
            .clone()
            .oneshot(Request::get("/static/reader.css").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert!(body_text(response).await.contains("[data-theme=\"dark\"]"));

        let response = router
            .oneshot(Request::get("/static/missing.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn error_page_escapes_message() {
        let response = render_error_page(Theme::Dark, "<b>boom</b>");
        assert!(response.status().is_success());
        let html = body_text(response).await;
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(!html.contains("<b>boom"));
        assert!(html.contains("data-theme=\"dark\""));
    }

    fn gated_router() -> (Router, Arc<tokio::sync::Notify>) {
        let (source, gate) = ScriptedSource::new()
            .with_article(
                "Quantum Computing",
                summary_fixture("Quantum Computing"),
                "<p>slow quantum</p>",
            )
            .with_article(
                "Renaissance",
                summary_fixture("Renaissance"),
                "<p>fast renaissance</p>",
            )
            .with_gate("Quantum Computing");
        let reader = Arc::new(Reader::new(
            Arc::new(source),
            Sanitizer::default(),
            RelatedTopics::curated(),
            ThemeStore::ephemeral(),
        ));
        (build_router(Arc::new(AppState { reader })), gate)
    }

    #[tokio::test]
    async fn overlapping_fragments_answer_their_own_topic() {
        let (router, gate) = gated_router();
        let slow = router.clone().oneshot(
            Request::get("/fragment?topic=Quantum%20Computing")
                .body(Body::empty())
                .unwrap(),
        );
        let fast = async {
            let response = router
                .clone()
                .oneshot(
                    Request::get("/fragment?topic=Renaissance")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            gate.notify_one();
            response
        };
        let (slow, fast) = tokio::join!(slow, fast);
        let slow = slow.unwrap();

        assert_ne!(slow.headers()["x-load-token"], fast.headers()["x-load-token"]);
        let slow_html = body_text(slow).await;
        assert!(slow_html.contains("slow quantum"));
        assert!(slow_html.contains("data-topic=\"Quantum Computing\""));
        assert!(!slow_html.contains("fast renaissance"));
        let fast_html = body_text(fast).await;
        assert!(fast_html.contains("fast renaissance"));
        assert!(!fast_html.contains("slow quantum"));
    }

    #[tokio::test]
    async fn overlapping_pages_show_their_own_topic() {
        let (router, gate) = gated_router();
        let slow = router.clone().oneshot(
            Request::get("/?topic=Quantum%20Computing")
                .body(Body::empty())
                .unwrap(),
        );
        let fast = async {
            let response = router
                .clone()
                .oneshot(Request::get("/?topic=Renaissance").body(Body::empty()).unwrap())
                .await
                .unwrap();
            gate.notify_one();
            response
        };
        let (slow, fast) = tokio::join!(slow, fast);

        let slow_html = body_text(slow.unwrap()).await;
        assert!(slow_html.contains("<title>Quantum Computing • Wiki Reader</title>"));
        assert!(slow_html.contains("slow quantum"));
        assert!(!slow_html.contains("fast renaissance"));
        let fast_html = body_text(fast).await;
        assert!(fast_html.contains("<title>Renaissance • Wiki Reader</title>"));
        assert!(fast_html.contains("fast renaissance"));
    }
}
