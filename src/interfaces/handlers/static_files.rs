use std::path::{Component, Path, PathBuf};

use actix_files::{Files, NamedFile};
use actix_web::{
    dev::{fn_service, ServiceRequest, ServiceResponse},
    Error, HttpResponse,
};

/// Extensions tried, in order, for paths that name no extension.
pub const IMPLICIT_EXTENSIONS: [&str; 3] = ["html", "css", "js"];

/// Serves the site root without directory listings or index files.
/// Unknown extensionless paths fall back to `IMPLICIT_EXTENSIONS`.
pub fn static_files(root: &Path) -> Files {
    let fallback_root = root.to_path_buf();

    Files::new("/", root)
        .use_hidden_files()
        .path_filter(|path, _| !is_hidden(path))
        .default_handler(fn_service(move |req: ServiceRequest| {
            let root = fallback_root.clone();
            async move { resolve_with_extension(root, req).await }
        }))
}

async fn resolve_with_extension(root: PathBuf, req: ServiceRequest) -> Result<ServiceResponse, Error> {
    let (req, _) = req.into_parts();

    let response = match implicit_candidate(&root, req.path()) {
        Some(path) => match NamedFile::open_async(&path).await {
            Ok(file) => file.into_response(&req),
            Err(_) => HttpResponse::NotFound().finish(),
        },
        None => HttpResponse::NotFound().finish(),
    };

    Ok(ServiceResponse::new(req, response))
}

fn implicit_candidate(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = decoded.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        return None;
    }

    let relative = Path::new(relative);
    let only_normal = relative.components().all(|c| matches!(c, Component::Normal(_)));
    if !only_normal || is_hidden(relative) || relative.extension().is_some() {
        return None;
    }

    IMPLICIT_EXTENSIONS
        .iter()
        .map(|ext| root.join(relative.with_extension(ext)))
        .find(|candidate| candidate.is_file())
}

fn is_hidden(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}
