//! # API Gateway
//!
//! The single public entry point for every client of this workspace's
//! services: it authenticates requests, reverse-proxies matched paths to
//! whichever backend service instance the [`registry`] currently knows
//! about, and serves a small set of its own endpoints locally (accounts,
//! sessions, password reset, prefix search, and a notification
//! WebSocket) for anything the registry doesn't claim.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      dispatch middleware                         │
//! │   match path against the service registry (see `registry/`)     │
//! └──────────────┬────────────────────────────┬─────────────────────┘
//!                │ hit                         │ miss
//!                ▼                             ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────────┐
//! │  reverse proxy (reqwest)  │   │        local API (api/)          │
//! │  to the matched instance  │   │  users / sessions / resetcodes   │
//! └───────────────────────────┘   │  / summary / ws (notifier/)      │
//!                                 └─────────────────────────────────┘
//! ```
//!
//! Two background loops run alongside the HTTP server: the service
//! registry's pub/sub [`registry::listener`] and periodic
//! [`registry::reaper`], and the notification [`notifier::consumer`]
//! that fans MQ events out to connected WebSocket clients.
//!
//! ## Configuration
//!
//! Loaded via [`shared::config::AppConfig::from_env`] — see that module
//! for the full list of environment variables this process reads.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::{
    auth::password::PasswordHasher, config::AppConfig, database, redis_client::RedisClient,
    tracing_config,
};
use std::sync::{Arc, RwLock};
use tracing::info;

mod api;
mod attempts;
mod dispatch;
mod domain;
mod mailer;
mod notifier;
mod registry;
mod repository;
mod resetcodes;
mod sessions;
mod trie;

use attempts::{AttemptStore, RedisAttemptStore};
use dispatch::Dispatch;
use mailer::{Mailer, SmtpMailer};
use notifier::ConnectionMap;
use registry::ServiceRegistry;
use repository::UserRepository;
use resetcodes::{RedisResetCodeStore, ResetCodeStore};
use sessions::{RedisSessionStore, SessionStore};
use trie::Trie;

/// Duration a session stays valid between uses (see
/// [`sessions::store::RedisSessionStore`]'s TTL-refresh-on-read).
const SESSION_DURATION: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Shared application state injected into every local handler.
///
/// Wrapped in [`actix_web::web::Data`] and cloned (cheaply — everything
/// inside is an `Arc` or a `Clone`-cheap pool handle) across worker
/// threads.
pub struct AppState {
    pub user_repo: UserRepository,
    pub session_store: Arc<dyn SessionStore>,
    pub attempt_store: Arc<dyn AttemptStore>,
    pub reset_code_store: Arc<dyn ResetCodeStore>,
    pub mailer: Arc<dyn Mailer>,
    pub password_hasher: PasswordHasher,
    pub trie: Arc<RwLock<Trie>>,
    pub signing_key: String,
}

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create the PostgreSQL connection pool and run pending migrations
/// 4. Create the two Redis clients — one for session/attempt/reset-code
///    state, one dedicated to the pub/sub `MQADDR` role
/// 5. Instantiate stores, the registry, and the trie
/// 6. Spawn the registry listener/reaper and the notifier consumer
/// 7. Configure and start the HTTP server, with the dispatch middleware
///    wrapping the whole app
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Load configuration from environment
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Initialize structured logging
    // ─────────────────────────────────────────────────────────────────────
    tracing_config::init_tracing(&config.service_name, config.is_production());

    info!(service = %config.service_name, addr = %config.addr, "Starting gateway");

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Create PostgreSQL connection pool and run migrations
    // ─────────────────────────────────────────────────────────────────────
    let db_pool = database::create_pool(&config.database())
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("../db/migrations/postgresql")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations");

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Create Redis clients
    // ─────────────────────────────────────────────────────────────────────
    // `store_redis` backs the session/attempt/reset-code stores;
    // `mq_redis` is a separate handle for the registry listener and
    // notifier consumer, which each hold a dedicated pub/sub connection
    // (see `shared::redis_client::RedisClient`).
    let store_redis = RedisClient::new(&config.redis())
        .await
        .expect("Failed to connect to Redis (store role)");
    let mq_redis = RedisClient::new(&config.mq())
        .await
        .expect("Failed to connect to Redis (mq role)");

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Instantiate stores, the registry, and the trie
    // ─────────────────────────────────────────────────────────────────────
    let session_store: Arc<dyn SessionStore> =
        Arc::new(RedisSessionStore::new(store_redis.clone(), SESSION_DURATION));
    let attempt_store: Arc<dyn AttemptStore> =
        Arc::new(RedisAttemptStore::new(store_redis.clone()));
    let reset_code_store: Arc<dyn ResetCodeStore> =
        Arc::new(RedisResetCodeStore::new(store_redis.clone()));
    let mailer: Arc<dyn Mailer> =
        Arc::new(SmtpMailer::new(&config.smtp).expect("Failed to configure SMTP transport"));

    let user_repo = UserRepository::new(db_pool.clone());
    let password_hasher = PasswordHasher::new();
    let trie = Arc::new(RwLock::new(Trie::new()));
    let registry = Arc::new(ServiceRegistry::new());
    let connections = Arc::new(ConnectionMap::new());
    let http_client = reqwest::Client::new();

    let app_state = web::Data::new(AppState {
        user_repo,
        session_store: session_store.clone(),
        attempt_store,
        reset_code_store,
        mailer,
        password_hasher,
        trie,
        signing_key: config.session_key.clone(),
    });

    // ─────────────────────────────────────────────────────────────────────
    // Step 6: Spawn background tasks
    // ─────────────────────────────────────────────────────────────────────
    actix_web::rt::spawn(registry::listener::run(mq_redis.clone(), registry.clone()));
    actix_web::rt::spawn(registry::reaper::run(registry.clone()));
    actix_web::rt::spawn(notifier::consumer::run(mq_redis, connections.clone()));

    let dispatch = Dispatch {
        registry,
        session_store: session_store.clone(),
        signing_key: config.session_key.clone(),
        http_client,
    };

    let connections_data = web::Data::new(connections);
    let session_store_data = web::Data::new(session_store);
    let signing_key_data = web::Data::new(config.session_key.clone());

    // ─────────────────────────────────────────────────────────────────────
    // Step 7: Configure and start the HTTP server
    // ─────────────────────────────────────────────────────────────────────
    let bind_addr = config.addr.clone();
    info!("Gateway listening on {}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin() // TODO: restrict to configured origins in production
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            // ─────────────────────────────────────────────────────────
            // Middleware Stack (order matters: first added = last executed)
            // ─────────────────────────────────────────────────────────
            .wrap(dispatch.clone()) // reverse-proxy on a registry hit, fall through otherwise
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // ─────────────────────────────────────────────────────────
            // Shared State
            // ─────────────────────────────────────────────────────────
            .app_data(app_state.clone())
            .app_data(connections_data.clone())
            .app_data(session_store_data.clone())
            .app_data(signing_key_data.clone())
            // ─────────────────────────────────────────────────────────
            // Routes Configuration
            // ─────────────────────────────────────────────────────────
            .configure(api::routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
