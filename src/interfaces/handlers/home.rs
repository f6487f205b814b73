use actix_files::NamedFile;
use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::AppState;

#[get("/")]
pub async fn home(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let index = state.static_dir.join("index.html");

    match NamedFile::open_async(&index).await {
        Ok(file) => {
            tracing::debug!("Serving index.html");
            file.into_response(&req)
        }
        Err(e) => {
            tracing::error!(error = %e, path = %index.display(), "Error sending index.html");
            HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Error loading the page")
        }
    }
}
