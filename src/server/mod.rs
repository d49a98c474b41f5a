//! The viewer's web interface.

use crate::{build_page, Config, Session, SmilesParser, SvgRenderer};
use actix_web::{http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use std::sync::RwLock;
use tracing::*;

pub mod html;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
pub const FILE_NAME_HEADER: &str = "X-File-Name";

pub type SharedSession = web::Data<RwLock<Session>>;

#[derive(Debug, Deserialize)]
struct Selection {
    neutral: Option<String>,
}

/// Upload metadata carried in the query string; `name` arrives URL-encoded.
#[derive(Debug, Deserialize)]
struct UploadInfo {
    name: Option<String>,
}

fn internal_error(error: impl std::fmt::Display) -> HttpResponse {
    error!("Request failed: {}", error);
    HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(html::error_page(error))
}

fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Renders the page for the current session and dropdown selection.
async fn index(
    session: SharedSession,
    renderer: web::Data<SvgRenderer>,
    query: web::Query<Selection>,
) -> HttpResponse {
    let session = match session.read() {
        Ok(session) => session,
        Err(e) => return internal_error(format!("Session state is unavailable: {e}")),
    };
    let page = build_page(
        &session,
        query.neutral.as_deref(),
        &SmilesParser,
        renderer.get_ref(),
    );
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html::render_document(&page, session.file_name()))
}

/// Loads the request body as the session's dataset. The file name comes from
/// the `name` query parameter, or else the `X-File-Name` header.
async fn upload(
    session: SharedSession,
    req: HttpRequest,
    info: web::Query<UploadInfo>,
    body: web::Bytes,
) -> HttpResponse {
    let file_name = info.into_inner().name.or_else(|| {
        req.headers()
            .get(FILE_NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    info!("Received upload {:?} ({} bytes)", file_name, body.len());

    match session.write() {
        Ok(mut session) => session.load(&body, file_name.as_deref()),
        Err(e) => return internal_error(format!("Session state is unavailable: {e}")),
    }
    redirect_home()
}

async fn reset(session: SharedSession) -> HttpResponse {
    match session.write() {
        Ok(mut session) => session.reset(),
        Err(e) => return internal_error(format!("Session state is unavailable: {e}")),
    }
    redirect_home()
}

/// Registers the viewer routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/upload", web::post().to(upload))
        .route("/reset", web::post().to(reset));
}

/// Serves the viewer until the server is stopped.
pub async fn run(config: Config) -> std::io::Result<()> {
    let session: SharedSession = web::Data::new(RwLock::new(Session::new()));
    let renderer = web::Data::new(SvgRenderer::new(config.image_size));

    info!(
        "Serving the molecule pair visualizer on http://{}:{}",
        config.host, config.port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(session.clone())
            .app_data(renderer.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .configure(routes)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
