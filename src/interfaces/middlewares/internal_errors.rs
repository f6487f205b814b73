use actix_web::{
    dev::ServiceResponse,
    http::StatusCode,
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    ResponseError, Result,
};

use crate::errors::AppError;

/// Renders server errors raised outside `AppError` (extractor and
/// framework failures) as the JSON `Internal server error` envelope.
/// Responses built by handlers without an attached error pass through.
pub fn internal_error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, render_internal_error)
}

fn render_internal_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let detail = match res.response().error() {
        Some(err) if err.as_error::<AppError>().is_none() => err.to_string(),
        _ => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };

    tracing::error!(error = %detail, path = %res.request().path(), "Unhandled error");

    let (req, _) = res.into_parts();
    let response = AppError::InternalError(detail).error_response();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}
