use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use bson::doc;
use hoot_service::db::HootStore;
use hoot_service::handlers;
use hoot_service::middleware::JwtAuth;
use hoot_service::AppError;
use mongodb::Client;
use std::io;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Health check route, deliberately outside the authenticated scope.
async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Hoot API is running!" }))
}

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "err": "Route not found" }))
}

/// Bodies that fail to parse surface as the generic 500 envelope; the
/// parse detail is only logged server-side.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::error!("request body rejected: {err}");
        AppError::Internal("Something went wrong!".to_string()).into()
    })
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match hoot_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e}");
            eprintln!("ERROR: Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting hoot-service v{}", env!("CARGO_PKG_VERSION"));

    let client = Client::with_uri_str(&config.database.uri).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid MongoDB connection string: {e}"),
        )
    })?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database(&config.database.database));
    let store = HootStore::new(&db);

    // The driver connects lazily; probe in the background and log the
    // outcome. The server listens regardless, and store operations fail
    // per request until the store is reachable.
    {
        let db = db.clone();
        tokio::spawn(async move {
            match db.run_command(doc! { "ping": 1 }).await {
                Ok(_) => tracing::info!("Connected to MongoDB {}.", db.name()),
                Err(e) => tracing::error!("MongoDB connection error: {e}"),
            }
        });
    }

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {bind_address}");

    let secret = config.auth.jwt_secret.clone();
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(TracingLogger::default())
            .route("/", web::get().to(index))
            .service(
                web::scope("/hoots")
                    .wrap(JwtAuth::new(secret.clone()))
                    .service(
                        web::resource("")
                            .route(web::post().to(handlers::create_hoot))
                            .route(web::get().to(handlers::list_hoots)),
                    )
                    .service(
                        web::resource("/{hoot_id}")
                            .route(web::get().to(handlers::get_hoot))
                            .route(web::put().to(handlers::update_hoot))
                            .route(web::delete().to(handlers::delete_hoot)),
                    )
                    .route(
                        "/{hoot_id}/comments",
                        web::post().to(handlers::create_comment),
                    ),
            )
            .default_service(web::route().to(route_not_found))
    })
    .bind(&bind_address)?
    .run();

    // Termination stops the process; in-flight requests are not drained.
    tokio::select! {
        result = server => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, hoot-service stopping");
            Ok(())
        }
    }
}
