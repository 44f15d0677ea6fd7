use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use catalog_service::middleware::AuthGuard;
use catalog_service::security::{RevocationRegistry, RevocationStore, TokenCodec};
use catalog_service::{db, handlers, Config};
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::RedisError;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: PgPool,
    redis_manager: ConnectionManager,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }

    async fn check_redis(&self) -> Result<(), RedisError> {
        let mut conn = self.redis_manager.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING response",
            )))
        }
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "catalog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "catalog-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    let start = Instant::now();
    let pg_result = state.check_postgres().await;
    let pg_latency = Some(start.elapsed().as_millis() as u64);
    let postgres_check = match pg_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: pg_latency,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms: pg_latency,
            }
        }
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let start = Instant::now();
    let redis_result = state.check_redis().await;
    let redis_latency = Some(start.elapsed().as_millis() as u64);
    let redis_check = match redis_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "Redis ping successful".to_string(),
            latency_ms: redis_latency,
        },
        Err(e) => {
            ready = false;
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("Redis ping failed: {}", e),
                latency_ms: redis_latency,
            }
        }
    };
    checks.insert("redis".to_string(), redis_check);

    let status = if ready {
        ComponentStatus::Healthy
    } else {
        ComponentStatus::Unhealthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting catalog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Token codec is built once here and handed down; handlers and the
    // guard never touch global key state
    let codec = match TokenCodec::from_config(&config.jwt) {
        Ok(codec) => Arc::new(codec),
        Err(e) => {
            tracing::error!("JWT codec initialization failed: {:#}", e);
            eprintln!("ERROR: Failed to initialize JWT codec: {}", e);
            std::process::exit(1);
        }
    };

    // Database pool and embedded migrations
    let db_pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Migration failed: {:#}", e);
        eprintln!("ERROR: Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Connected to database, migrations applied");

    // Redis connection manager for the revocation registry
    let redis_client = redis::Client::open(config.redis.url.as_str()).map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Invalid Redis URL: {e}"),
        )
    })?;
    let redis_manager = ConnectionManager::new(redis_client).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to connect to Redis: {e}"),
        )
    })?;

    let revocation: Arc<dyn RevocationStore> =
        Arc::new(RevocationRegistry::new(redis_manager.clone()));

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
        redis_manager,
    });

    let codec_data = web::Data::from(codec.clone());
    let revocation_data = web::Data::from(revocation.clone());

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let access_guard = AuthGuard::access(codec.clone(), revocation.clone());
        let refresh_guard = AuthGuard::refresh(codec.clone(), revocation.clone());

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(codec_data.clone())
            .app_data(revocation_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(handlers::signup))
                            .route("/login", web::post().to(handlers::login))
                            .service(
                                web::resource("/refresh")
                                    .wrap(refresh_guard)
                                    .route(web::get().to(handlers::refresh_token)),
                            )
                            .service(
                                web::resource("/me")
                                    .wrap(access_guard.clone())
                                    .route(web::get().to(handlers::me)),
                            )
                            .service(
                                web::resource("/logout")
                                    .wrap(access_guard.clone())
                                    .route(web::post().to(handlers::logout)),
                            ),
                    )
                    .service(
                        web::scope("/books")
                            .wrap(access_guard.clone())
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_books))
                                    .route(web::post().to(handlers::create_book)),
                            )
                            .route("/user", web::get().to(handlers::my_books))
                            .service(
                                web::resource("/{book_uid}")
                                    .route(web::get().to(handlers::get_book))
                                    .route(web::patch().to(handlers::update_book))
                                    .route(web::delete().to(handlers::delete_book)),
                            ),
                    )
                    .service(
                        web::scope("/reviews")
                            .wrap(access_guard.clone())
                            .route(
                                "/book/{book_uid}",
                                web::post().to(handlers::add_review),
                            )
                            .service(
                                web::resource("/{review_uid}")
                                    .route(web::patch().to(handlers::update_review))
                                    .route(web::delete().to(handlers::delete_review)),
                            ),
                    )
                    .service(
                        web::scope("/tags")
                            .wrap(access_guard)
                            .service(web::resource("").route(web::get().to(handlers::list_tags)))
                            .route("/{tag_uid}/books", web::get().to(handlers::books_by_tag))
                            .route(
                                "/{book_uid}/tags",
                                web::post().to(handlers::add_tags_to_book),
                            )
                            .route(
                                "/{book_uid}/tags/{tag_uid}",
                                web::delete().to(handlers::remove_tag_from_book),
                            )
                            .route("/{tag_uid}", web::get().to(handlers::get_tag)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
