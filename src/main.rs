use actix_web::{web, App, HttpServer};
use contact_relay::{
    background_task::start_limiter_purge_task,
    graceful_shutdown::stop_on_signal,
    middlewares::{
        cors::cors_from_origins, internal_errors::internal_error_handlers, rate_limit::RateLimit,
        security_headers::security_headers,
    },
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("APP_ENV")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);
    let cors_origins = config.cors_origins();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let purge_stores = vec![
        app_state.global_limiter.clone(),
        app_state.contact_limiter.clone(),
    ];

    let server = HttpServer::new(move || {
        let state = app_state.clone();
        App::new()
            .app_data(state.clone())
            .wrap(internal_error_handlers())
            .wrap(RateLimit::new(state.global_limiter.clone(), state.trust_x_forwarded_for))
            .wrap(security_headers())
            .wrap(cors_from_origins(&cors_origins))
            .wrap(TracingLogger::default())
            .configure(|cfg| configure_routes(cfg, &state))
    })
    .workers(config.worker_count)
    .disable_signals()
    .bind(server_addr)?
    .run();

    tokio::spawn(start_limiter_purge_task(purge_stores));
    tokio::spawn(stop_on_signal(server.handle()));

    server.await
}
