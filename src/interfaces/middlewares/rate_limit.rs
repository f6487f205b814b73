use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
    Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::rc::Rc;

use crate::{errors::AppError, limiter::rate_limiter::RateLimiterStore, utils::get_client_ip::get_client_ip};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Rejects clients that exceed the store's policy with a plain-text 429.
/// Stack one per policy; each keeps its own counters.
#[derive(Clone)]
pub struct RateLimit {
    store: RateLimiterStore,
    trust_x_forwarded_for: bool,
}

impl RateLimit {
    pub fn new(store: RateLimiterStore, trust_x_forwarded_for: bool) -> Self {
        RateLimit {
            store,
            trust_x_forwarded_for,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitService {
            service: Rc::new(service),
            store: self.store.clone(),
            trust_x_forwarded_for: self.trust_x_forwarded_for,
        })
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    store: RateLimiterStore,
    trust_x_forwarded_for: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let client_ip = get_client_ip(req.request(), self.trust_x_forwarded_for);
        let decision = self.store.check(&client_ip);
        let message = self.store.policy().message.clone();

        Box::pin(async move {
            if !decision.allowed {
                tracing::warn!(client_ip = %client_ip, path = %req.path(), "Rate limit exceeded");

                let mut response = AppError::RateLimited(message).error_response();
                let headers = response.headers_mut();
                headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
                headers.insert(REMAINING_HEADER, HeaderValue::from(0u64));
                if let Some(retry_after) = decision.retry_after {
                    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after.as_secs()));
                }

                return Ok(req.into_response(response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            let headers = res.headers_mut();
            // The innermost limiter is the most specific one, keep its numbers
            if !headers.contains_key(&LIMIT_HEADER) {
                headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
                headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
            }
            Ok(res.map_into_left_body())
        })
    }
}
