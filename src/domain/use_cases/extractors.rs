use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, FutureExt, LocalBoxFuture};

use crate::{entities::submission::ContactForm, errors::AppError};

/// Contact form body, accepted as JSON or urlencoded form data.
/// Any other content type yields an empty form, which then fails
/// validation like a form with no fields.
#[derive(Debug)]
pub struct ContactPayload(pub ContactForm);

impl FromRequest for ContactPayload {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_ascii_lowercase();

        if content_type == "application/x-www-form-urlencoded" {
            web::Form::<ContactForm>::from_request(req, payload)
                .map(|res| match res {
                    Ok(form) => Ok(ContactPayload(form.into_inner())),
                    Err(e) => Err(AppError::InvalidBody(e.to_string()).into()),
                })
                .boxed_local()
        } else if content_type == "application/json" || content_type.ends_with("+json") {
            web::Json::<ContactForm>::from_request(req, payload)
                .map(|res| match res {
                    Ok(json) => Ok(ContactPayload(json.into_inner())),
                    Err(e) => Err(AppError::InvalidBody(e.to_string()).into()),
                })
                .boxed_local()
        } else {
            ready(Ok(ContactPayload(ContactForm::default()))).boxed_local()
        }
    }
}
