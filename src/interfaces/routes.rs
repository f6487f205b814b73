use actix_web::{guard, web};

use crate::{
    handlers::{contact_me, home::home, static_files::static_files, system::health_check},
    middlewares::rate_limit::RateLimit,
    AppState,
};

const BODY_LIMIT: usize = 100 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::JsonConfig::default().limit(BODY_LIMIT))
        .app_data(web::FormConfig::default().limit(BODY_LIMIT));

    cfg.service(home);
    cfg.service(health_check);

    cfg.service(
        web::resource("/send-email")
            .guard(guard::Post())
            .wrap(RateLimit::new(state.contact_limiter.clone(), state.trust_x_forwarded_for))
            .route(web::post().to(contact_me::send_email))
    );

    // Must stay last, it matches every path
    cfg.service(static_files(&state.static_dir));
}
