//! Serve command - runs the Feline web server.

use std::{sync::Arc, time::Duration};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tower_cookies::{CookieManagerLayer, Cookies};
use tracing_subscriber::EnvFilter;

use feline::{
    Error,
    auth::{CredentialTable, TokenStore},
    engine::ProcessEngine,
    navigation::{BuilderOutcome, NavigationError, Navigator, Transition},
    session::{Location, ReturnTo, Session, SessionHandle, SessionStore},
};

use crate::cli::ServeArgs;
use crate::session::{
    active_session, clear_session_cookie, request_token, set_session_cookie,
};
use crate::templates;

/// Shared application state
#[derive(Clone)]
struct AppState {
    credentials: Arc<CredentialTable>,
    tokens: TokenStore,
    sessions: SessionStore,
    navigator: Navigator,
}

/// Login form data
#[derive(Deserialize)]
struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct FileSelectForm {
    file: String,
}

#[derive(Deserialize)]
struct SettingsForm {
    reviewtype: String,
}

#[derive(Deserialize)]
struct StarLineRequest {
    line: i64,
    starred: bool,
}

#[derive(Deserialize)]
struct LineNotesRequest {
    line: i64,
    text: String,
}

/// Builder autosave payload
#[derive(Deserialize)]
struct DraftRequest {
    title: String,
    text: String,
}

#[derive(Deserialize)]
struct BuilderQuery {
    #[serde(rename = "returnTo")]
    return_to: Option<String>,
}

impl AppState {
    /// State for a server using the default credential table.
    fn new(navigator: Navigator) -> Self {
        Self {
            credentials: Arc::new(CredentialTable::default()),
            tokens: TokenStore::new(),
            sessions: SessionStore::new(),
            navigator,
        }
    }
}

/// All Feline routes over `state`
fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_home))
        .route("/login", get(handle_login_page))
        .route("/session", get(handle_session_page))
        .route("/builder", get(handle_builder_page))
        .route("/health", get(handle_health_endpoint))
        .route("/feline/login", post(handle_login_submit))
        .route("/feline/logout", get(handle_logout).post(handle_logout))
        .route("/feline/startsession", post(handle_start_session))
        .route("/feline/fileselect", post(handle_file_select))
        .route("/feline/settings", post(handle_settings))
        .route("/feline/finishsession", post(handle_finish_session))
        .route("/feline/starline", post(handle_star_line))
        .route("/feline/linenotes", post(handle_line_notes))
        .route("/feline/linesets", get(handle_line_sets))
        .route("/feline/updatebuilder", post(handle_update_builder))
        .route("/feline/finishbuilder", post(handle_finish_builder))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Run the Feline server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("feline=info".parse()?))
        .init();

    let engine_dir = std::path::absolute(&args.engine_dir)?;
    if !engine_dir.is_dir() {
        tracing::warn!("Engine directory {} does not exist", engine_dir.display());
    }
    let scratch_dir = args.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
    tokio::fs::create_dir_all(&scratch_dir).await?;

    // Cancelled on shutdown so in-flight engine processes are killed
    let cancel = CancellationToken::new();
    let engine = ProcessEngine::new(&args.engine, &engine_dir)
        .with_timeout(Duration::from_secs(args.engine_timeout))
        .with_cancellation(cancel.clone());
    tracing::info!(
        program = %engine.program().display(),
        work_dir = %engine.work_dir().display(),
        "Using Line Engine"
    );

    let app = router(AppState::new(Navigator::new(Arc::new(engine), &scratch_dir)));

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Feline server started");
    println!();
    println!("Web Interface: http://localhost:{}", local_addr.port());
    println!("Line Engine:   {}", args.engine.display());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                     - Home page (requires login)");
    println!("  GET  /login                - Login page");
    println!("  GET  /session              - Current review page");
    println!("  GET  /builder              - Line-set builder");
    println!("  GET  /health               - Health check");
    println!("  POST /feline/login         - Login submission");
    println!("  POST /feline/startsession  - Begin a review");
    println!("  GET  /feline/linesets      - List line-sets (JSON)");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
            cancel.cancel();
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// The caller's session, or a redirect to the login page.
async fn session_or_login(state: &AppState, cookies: &Cookies) -> Result<SessionHandle, Response> {
    active_session(&state.tokens, &state.sessions, cookies)
        .await
        .map_err(|_| Redirect::to("/login").into_response())
}

/// The caller's session, or 401 for script clients.
async fn api_session(state: &AppState, cookies: &Cookies) -> Result<SessionHandle, Response> {
    active_session(&state.tokens, &state.sessions, cookies)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.user_message()).into_response())
}

fn error_response(err: Error) -> Response {
    match &err {
        Error::Auth(_) => Redirect::to("/login").into_response(),
        Error::Navigation(e) if e.is_wrong_location() => {
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
        Error::Navigation(NavigationError::NoFileSelected) => {
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
        _ if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        _ => {
            tracing::error!(module = err.module(), "Request failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Moved transitions go to the session page; stale ones re-render it in place.
fn transition_response(session: &Session, transition: Transition) -> Response {
    match transition {
        Transition::Moved(_) => Redirect::to("/session").into_response(),
        Transition::Stale(_) => Html(templates::session_page(session)).into_response(),
    }
}

// ============================================================================
// Page Handlers
// ============================================================================

/// Handler for GET / - Home page
async fn handle_home(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let session = handle.lock().await;
    Html(templates::home_page(session.username(), session.is_reviewing())).into_response()
}

/// Handler for GET /login - Show login page
async fn handle_login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if active_session(&state.tokens, &state.sessions, &cookies)
        .await
        .is_ok()
    {
        return Redirect::to("/").into_response();
    }
    Html(templates::login_page(None)).into_response()
}

/// Handler for GET /session - Render the current page
async fn handle_session_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let session = handle.lock().await;
    Html(templates::session_page(&session)).into_response()
}

/// Handler for GET /builder - Show the builder form
async fn handle_builder_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<BuilderQuery>,
) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    let return_to = query.return_to.as_deref().and_then(ReturnTo::from_query);
    state.navigator.open_builder(&mut session, return_to);
    Html(templates::builder_page(session.draft())).into_response()
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "sessions": state.sessions.len().await,
        "logins": state.tokens.len().await,
    }))
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for POST /feline/login - Check credentials and issue a token
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let (Some(username), Some(password)) = (
        form.username.filter(|u| !u.is_empty()),
        form.password.filter(|p| !p.is_empty()),
    ) else {
        return (StatusCode::BAD_REQUEST, "Missing user authentication").into_response();
    };

    let user = match state.credentials.authenticate(&username, &password) {
        Ok(user) => user,
        Err(e) => {
            tracing::info!("Login failed for {username}: {e}");
            return Html(templates::login_page(Some(e.user_message()))).into_response();
        }
    };

    let token = match state.tokens.issue(user.clone()).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Could not issue token for {user}: {e}");
            return Html(templates::login_page(Some(e.user_message()))).into_response();
        }
    };
    set_session_cookie(&cookies, &token);
    tracing::info!(user = %user, "Logged in");

    let handle = state.sessions.get_or_create(&user).await;
    let mut session = handle.lock().await;
    if session.location() != Location::Unset {
        // Returning user: resume from the home page
        return Redirect::to("/").into_response();
    }
    match state.navigator.start(&mut session).await {
        Ok(transition) => transition_response(&session, transition),
        Err(e) => error_response(e),
    }
}

/// Handler for /feline/logout - Revoke the token and clear the cookie
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(token) = request_token(&cookies) {
        state.tokens.revoke(&token).await;
    }
    clear_session_cookie(&cookies);
    Redirect::to("/login")
}

// ============================================================================
// Review Flow Handlers
// ============================================================================

/// Handler for POST /feline/startsession
async fn handle_start_session(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state.navigator.start(&mut session).await {
        Ok(transition) => transition_response(&session, transition),
        Err(e) => error_response(e),
    }
}

/// Handler for POST /feline/fileselect
async fn handle_file_select(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<FileSelectForm>,
) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state.navigator.select_file(&mut session, &form.file).await {
        Ok(transition) => transition_response(&session, transition),
        Err(e) => error_response(e),
    }
}

/// Handler for POST /feline/settings
async fn handle_settings(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SettingsForm>,
) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state
        .navigator
        .choose_review_method(&mut session, &form.reviewtype)
        .await
    {
        Ok(transition) => transition_response(&session, transition),
        Err(e) => error_response(e),
    }
}

/// Handler for POST /feline/finishsession
async fn handle_finish_session(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    let transition = state.navigator.finish(&mut session);
    transition_response(&session, transition)
}

/// Handler for POST /feline/starline
async fn handle_star_line(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<StarLineRequest>,
) -> Response {
    let handle = match api_session(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state
        .navigator
        .star_line(&mut session, request.line, request.starred)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// Handler for POST /feline/linenotes
async fn handle_line_notes(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<LineNotesRequest>,
) -> Response {
    let handle = match api_session(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state
        .navigator
        .annotate_line(&mut session, request.line, &request.text)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

/// Handler for GET /feline/linesets
async fn handle_line_sets(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match api_session(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let session = handle.lock().await;
    match state.navigator.line_sets(&session).await {
        Ok(files) => Json(files).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Builder Handlers
// ============================================================================

/// Handler for POST /feline/updatebuilder - Autosave the draft
async fn handle_update_builder(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<DraftRequest>,
) -> Response {
    let handle = match api_session(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    state
        .navigator
        .update_draft(&mut session, request.title, request.text);
    StatusCode::NO_CONTENT.into_response()
}

/// Handler for POST /feline/finishbuilder - Submit the draft to the engine
async fn handle_finish_builder(State(state): State<AppState>, cookies: Cookies) -> Response {
    let handle = match session_or_login(&state, &cookies).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let mut session = handle.lock().await;
    match state.navigator.finish_builder(&mut session).await {
        Ok(BuilderOutcome::Accepted { return_to }) => Redirect::to(return_to.path()).into_response(),
        Ok(BuilderOutcome::Rejected { .. }) => {
            Html(templates::builder_page(session.draft())).into_response()
        }
        Err(e) => error_response(e),
    }
}
