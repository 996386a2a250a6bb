//! Serve command - question form and JSON API over HTTP

use clap::Args;

use super::BackendArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Enable CORS for all origins
    #[arg(long)]
    pub cors: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[cfg(feature = "server")]
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    use std::sync::{Arc, Mutex};

    use axum::{
        routing::{get, post},
        Router,
    };
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    use crate::rag::PipelineCache;

    let config = args.backend.resolve();
    let host = args.host.clone().unwrap_or(config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    // Build once up front so a broken config fails at startup
    let mut cache = PipelineCache::new();
    cache.get_for_config(&config)?;

    let state = Arc::new(AppState {
        backend: args.backend,
        cache: Arc::new(Mutex::new(cache)),
    });

    let mut app = Router::new()
        .route("/", get(form_page).post(form_submit))
        .route("/api/ask", post(api_ask))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if args.cors {
        app = app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    }

    let addr = format!("{}:{}", host, port);
    println!("devchat listening on http://{}", addr);
    println!("  GET  /         - Question form");
    println!("  POST /api/ask  - Ask a question (JSON)");
    println!("  GET  /health   - Health check");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "server"))]
pub async fn run(_args: ServeArgs) -> anyhow::Result<()> {
    anyhow::bail!("Server feature not enabled. Rebuild with --features server")
}

#[cfg(feature = "server")]
struct AppState {
    backend: BackendArgs,
    cache: std::sync::Arc<std::sync::Mutex<crate::rag::PipelineCache>>,
}

#[cfg(feature = "server")]
impl AppState {
    /// Answer with the pipeline for the current config
    ///
    /// The config file is re-read per request and the pipeline is rebuilt
    /// only when its key changes. Both run on the blocking pool, since a
    /// rebuild may load a local model.
    async fn answer(&self, question: &str) -> anyhow::Result<String> {
        let backend = self.backend.clone();
        let cache = self.cache.clone();

        let pipeline = tokio::task::spawn_blocking(move || {
            let config = backend.resolve();
            let mut cache = cache
                .lock()
                .map_err(|_| anyhow::anyhow!("Pipeline cache lock poisoned"))?;
            cache.get_for_config(&config)
        })
        .await??;

        pipeline.answer(question).await
    }
}

#[cfg(feature = "server")]
#[derive(serde::Deserialize)]
struct QuestionForm {
    #[serde(rename = "Question", default)]
    question: String,
}

#[cfg(feature = "server")]
#[derive(serde::Deserialize)]
struct AskRequest {
    question: String,
}

#[cfg(feature = "server")]
#[derive(serde::Serialize)]
struct AskResponse {
    answer: String,
}

#[cfg(feature = "server")]
type AppResult<T> = Result<T, (axum::http::StatusCode, String)>;

#[cfg(feature = "server")]
fn internal_error(e: anyhow::Error) -> (axum::http::StatusCode, String) {
    tracing::error!("Request failed: {:#}", e);
    (axum::http::StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

#[cfg(feature = "server")]
async fn health() -> &'static str {
    "ok"
}

#[cfg(feature = "server")]
async fn form_page() -> axum::response::Html<String> {
    axum::response::Html(render_page("", None))
}

#[cfg(feature = "server")]
async fn form_submit(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<AppState>>,
    axum::Form(form): axum::Form<QuestionForm>,
) -> AppResult<axum::response::Html<String>> {
    let answer = state.answer(&form.question).await.map_err(internal_error)?;
    Ok(axum::response::Html(render_page(&form.question, Some(&answer))))
}

#[cfg(feature = "server")]
async fn api_ask(
    axum::extract::State(state): axum::extract::State<std::sync::Arc<AppState>>,
    axum::Json(request): axum::Json<AskRequest>,
) -> AppResult<axum::Json<AskResponse>> {
    let answer = state.answer(&request.question).await.map_err(internal_error)?;
    Ok(axum::Json(AskResponse { answer }))
}

/// The single page: title, question input, submit button and answer area
#[cfg(feature = "server")]
fn render_page(question: &str, answer: Option<&str>) -> String {
    let answer_area = match answer {
        Some(answer) => format!(
            r#"<label for="answer">Answer</label>
<textarea id="answer" rows="14" disabled>{}</textarea>"#,
            escape_html(answer)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Chatbot for Developers</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
input, textarea {{ width: 100%; box-sizing: border-box; margin: 0.5rem 0 1rem; }}
</style>
</head>
<body>
<h1>Chatbot for Developers</h1>
<p>Enter your query.</p>
<form method="post" action="/">
<label for="question">Question</label>
<input id="question" name="Question" type="text" value="{}" autofocus>
<button type="submit">Submit</button>
</form>
{}
</body>
</html>
"#,
        escape_html(question),
        answer_area
    )
}

#[cfg(feature = "server")]
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
