use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

mod combat;
mod db;
mod entity;
mod item;
mod map;
mod npc;
mod player;
mod protocol;
mod world;

use combat::CombatEngine;
use db::Database;
use entity::ProfileRegistry;
use item::WorldItemStore;
use map::MapRegistry;
use player::PlayerStore;
use protocol::{AggroTickRequest, AttackRequest, JoinRequest};
use world::WorldState;

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
struct AppState {
    maps: Arc<MapRegistry>,
    profiles: Arc<ProfileRegistry>,
    players: Arc<PlayerStore>,
    world: Arc<WorldState>,
    items: Arc<WorldItemStore>,
    engine: Arc<CombatEngine>,
}

impl AppState {
    async fn new() -> Self {
        // Initialize database
        let database = Database::new("sqlite:game.db?mode=rwc")
            .await
            .expect("Failed to initialize database");

        let data_dir = std::path::Path::new("data");

        // Load NPC profiles from TOML files
        let mut profiles = ProfileRegistry::new();
        if let Err(e) = profiles.load_from_directory(data_dir) {
            error!("Failed to load NPC profiles: {}", e);
        }

        // Load map definitions from TOML files
        let mut maps = MapRegistry::new();
        if let Err(e) = maps.load_from_directory(data_dir) {
            error!("Failed to load map definitions: {}", e);
        }

        let maps = Arc::new(maps);
        let profiles = Arc::new(profiles);
        let players = Arc::new(PlayerStore::new(Some(Arc::new(database))));
        let world = Arc::new(WorldState::new());
        let items = Arc::new(WorldItemStore::new());

        // Spawn NPC records for every known map up front so collaborators
        // see populated maps before the first combat request
        for name in maps.names() {
            if let Some(definition) = maps.get(name) {
                world.get_or_spawn(name, definition, &profiles);
            }
        }

        let engine = Arc::new(CombatEngine::new(
            maps.clone(),
            profiles.clone(),
            players.clone(),
            world.clone(),
            items.clone(),
        ));

        Self {
            maps,
            profiles,
            players,
            world,
            items,
            engine,
        }
    }
}

/// Epoch milliseconds; the implicit "now" of each combat resolution
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

// ============================================================================
// HTTP Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis()
    }))
}

/// Load or create a player profile and make it live.
async fn join_player(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> impl IntoResponse {
    match state.players.load_or_create(&req.actor_id, &req.name).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            error!("Failed to load player {}: {}", req.actor_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable").into_response()
        }
    }
}

/// Entry point A: player-initiated attack.
async fn handle_attack(
    State(state): State<AppState>,
    Json(req): Json<AttackRequest>,
) -> impl IntoResponse {
    let outcome = state.engine.resolve_player_attack(&req, now_ms()).await;
    Json(outcome)
}

/// Entry point B: periodic hostile-counterattack resolution.
async fn handle_aggro_tick(
    State(state): State<AppState>,
    Json(req): Json<AggroTickRequest>,
) -> impl IntoResponse {
    let outcome = state.engine.resolve_aggro_tick(&req, now_ms()).await;
    Json(outcome)
}

/// Authoritative NPC records for one map (rendering/movement collaborators).
async fn list_map_npcs(
    State(state): State<AppState>,
    Path(map_name): Path<String>,
) -> impl IntoResponse {
    match state.world.get(&map_name) {
        Some(instance) => Json(instance.npc_views(&state.profiles).await).into_response(),
        None => {
            if state.maps.get(&map_name).is_some() {
                Json(Vec::<npc::NpcView>::new()).into_response()
            } else {
                (StatusCode::NOT_FOUND, "unknown map").into_response()
            }
        }
    }
}

/// World-placed items on one map.
async fn list_map_items(
    State(state): State<AppState>,
    Path(map_name): Path<String>,
) -> impl IntoResponse {
    if state.maps.get(&map_name).is_none() {
        return (StatusCode::NOT_FOUND, "unknown map").into_response();
    }
    Json(state.items.items_on_map(&map_name).await).into_response()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tileworld_server=info".parse().unwrap()),
        )
        .init();

    let state = AppState::new().await;

    // Spawn auto-save loop (every 30 seconds)
    let save_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let saved = save_state.players.persist_all().await;
            if saved > 0 {
                info!("Auto-saved {} player(s) to database", saved);
            }
        }
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/players", post(join_player))
        .route("/api/combat/attack", post(handle_attack))
        .route("/api/combat/tick", post(handle_aggro_tick))
        .route("/api/maps/:map/npcs", get(list_map_npcs))
        .route("/api/maps/:map/items", get(list_map_items))
        // In development, you may want CorsLayer::permissive()
        // For production, specify allowed origins explicitly
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 4000));
    info!("Game server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
