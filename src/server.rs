use std::time::Instant;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::{get_service, post},
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::AppState;
use crate::contract::{SEARCH_PATH, SearchForm, SearchResponse};

/// Reply sent while another question is being answered.
pub const BUSY_MESSAGE: &str =
    "Sorry, I can only handle one request at a time and I'm currently busy.";

const BODY_LIMIT: usize = 64 * 1024;

/// Chat page, static assets and the search endpoint.
pub fn router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get_service(ServeFile::new("static/index.html")))
        .route(SEARCH_PATH, post(search))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                let Some(limit) = timeout else {
                    return next.run(req).await;
                };
                match tokio::time::timeout(limit, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// POST /search - answer one question.
async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let request_id = Uuid::new_v4();
    answer_question(state, form)
        .instrument(info_span!("search", %request_id))
        .await
}

async fn answer_question(
    state: AppState,
    form: SearchForm,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    info!(
        name: "search.received",
        question = %form.input_text,
        "Received web request"
    );

    let Ok(_guard) = state.busy.try_lock() else {
        warn!(name: "search.busy", "Already answering another question");
        return Ok(Json(SearchResponse {
            result: BUSY_MESSAGE.to_string(),
        }));
    };

    let started = Instant::now();
    let answer = state.orchestrator.answer(&form.input_text).await;
    let result = answer.to_html().map_err(|e| {
        error!(error = %e, "Failed to render answer");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        name: "search.completed",
        elapsed_secs = elapsed,
        sources = answer.sources.len(),
        "Completed in {elapsed:.2} seconds"
    );
    Ok(Json(SearchResponse { result }))
}
