use crate::{
    cmd::{build_crawler, connect},
    config::Settings,
    modules::{
        handlers::{
            league::{
                add_team, create_league, delete_league, delete_team, get_league, get_standings,
                list_my_leagues, list_teams, update_team, USER_ID_HEADER,
            },
            liveness,
            medal::{list_medals, list_tiers, sync_medals, SyncToken, SYNC_TOKEN_HEADER},
            readiness,
        },
        leagues::{
            service::LeagueService,
            store::{LeagueStore, MemoryLeagueStore, PgLeagueStore},
        },
        medals::{
            crawler::MedalCrawler,
            schedule::spawn_medal_sync,
            store::{MedalStore, MemoryMedalStore, PgMedalStore},
        },
    },
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{CONTENT_TYPE, HeaderName},
        HeaderValue, Method,
    },
    routing, Router, Server,
};
use clap::Args;
use medal_tracker_libs::clock::{Clock, SystemClock};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Do not run the periodic medal sync in this process.
    #[arg(long)]
    no_schedule: bool,
    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long)]
    memory: bool,
}

/// Everything the request handlers share.
pub struct Services {
    pub medals: Arc<dyn MedalStore>,
    pub crawler: Arc<MedalCrawler>,
    pub leagues: Arc<LeagueService>,
    pub sync_token: SyncToken,
}

pub async fn run(args: ServerArgs, settings: Settings) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (medals, leagues): (Arc<dyn MedalStore>, Arc<dyn LeagueStore>) = if args.memory {
        tracing::warn!("Server runs with in-memory stores; data is lost on shutdown.");
        (
            Arc::new(MemoryMedalStore::new()),
            Arc::new(MemoryLeagueStore::new()),
        )
    } else {
        let pool = connect(&settings).await?;
        (
            Arc::new(PgMedalStore::new(pool.clone())),
            Arc::new(PgLeagueStore::new(pool)),
        )
    };

    let crawler = Arc::new(build_crawler(&settings, medals.clone(), clock.clone())?);
    let schedule = if args.no_schedule {
        tracing::info!("Periodic medal sync is disabled.");
        None
    } else {
        Some(spawn_medal_sync(crawler.clone(), settings.sync_interval))
    };

    let cors = cors_layer(settings.cors_allow_origin.as_deref())?;
    let app = create_router(
        Services {
            medals,
            crawler,
            leagues: Arc::new(LeagueService::new(leagues, clock)),
            sync_token: SyncToken(settings.sync_token.clone()),
        },
        cors,
    );

    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = "API server stopped unexpectedly.";
            tracing::error!(message);
            message
        })?;

    if let Some(schedule) = schedule {
        schedule.abort();
    }

    Ok(())
}

pub fn create_router(services: Services, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/medals", routing::get(list_medals))
        .route("/api/medals/sync", routing::post(sync_medals))
        .route("/api/tiers", routing::get(list_tiers))
        .route(
            "/api/leagues",
            routing::get(list_my_leagues).post(create_league),
        )
        .route(
            "/api/leagues/:slug",
            routing::get(get_league).delete(delete_league),
        )
        .route(
            "/api/leagues/:slug/teams",
            routing::get(list_teams).post(add_team),
        )
        .route("/api/leagues/:slug/standings", routing::get(get_standings))
        .route(
            "/api/teams/:id",
            routing::put(update_team).delete(delete_team),
        )
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(Extension(services.medals))
        .layer(Extension(services.crawler))
        .layer(Extension(services.leagues))
        .layer(Extension(services.sync_token))
        .layer(cors)
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let origin = match origin {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>().with_context(|| {
            let message = format!("invalid CORS_ALLOW_ORIGIN `{}`", origin);
            tracing::error!(message);
            message
        })?),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(SYNC_TOKEN_HEADER),
        ]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown.");
}
