use actix_web::{web, HttpResponse, Responder};

use crate::{errors::AppError, use_cases::extractors::ContactPayload, AppState};

pub async fn send_email(
    state: web::Data<AppState>,
    payload: ContactPayload,
) -> Result<impl Responder, AppError> {
    let form = payload.0;
    tracing::info!(
        has_name = form.name.is_some(),
        has_email = form.email.is_some(),
        has_message = form.message.is_some(),
        "Received contact form submission"
    );

    let response = state.contact_handler.submit(form).await?;

    Ok(HttpResponse::Ok().json(response))
}
