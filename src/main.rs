mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod testutil;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use std::sync::Arc;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let db = Db::open(&config.database_path).map_err(|e| {
        log::error!("Failed to open database {}: {}", config.database_path, e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    let db = Arc::new(db);

    log::info!("Arena league server starting on {}", config.bind_addr());

    web::HttpServer::new(move || {
        web::App::new()
            .state(db.clone())
            .wrap(web::middleware::Logger::default())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            // Health check
            .route("/api/health", web::get().to(health))
            // Players
            .route("/api/player", web::post().to(handlers::player::create_player))
            .route("/api/player/all", web::get().to(handlers::player::list_players))
            .route("/api/player/{id}", web::get().to(handlers::player::get_player))
            .route("/api/player/{id}", web::put().to(handlers::player::update_player))
            .route("/api/player/{id}", web::delete().to(handlers::player::delete_player))
            // Equippable items
            .route("/api/equippableItems", web::get().to(handlers::item::list_items))
            .route("/api/equippableItems", web::post().to(handlers::item::create_random_item))
            .route("/api/equippableItems/{id}", web::get().to(handlers::item::get_item))
            .route("/api/equippableItems/{id}", web::put().to(handlers::item::transfer_item))
            .route("/api/inventory", web::get().to(handlers::item::get_inventory))
            .route("/api/rarities", web::get().to(handlers::item::list_rarities))
            // Usable items
            .route(
                "/api/usableItems/getAll",
                web::get().to(handlers::usable::list_usable_items),
            )
            .route(
                "/api/usableItems/getUsableItemsOfUser",
                web::get().to(handlers::usable::usable_items_of_owner),
            )
            .route(
                "/api/usableItems/createRandomUsableItem",
                web::post().to(handlers::usable::create_random_usable_item),
            )
            // Player progress
            .route(
                "/api/completedQuests/getAll",
                web::get().to(handlers::progress::list_completed_quests),
            )
            .route(
                "/api/completedQuests/create",
                web::post().to(handlers::progress::create_completed_quest),
            )
            .route(
                "/api/collectedPois/getAll",
                web::get().to(handlers::progress::list_collected_pois),
            )
            .route(
                "/api/collectedPois/create",
                web::post().to(handlers::progress::create_collected_poi),
            )
            // League
            .route("/api/league", web::get().to(handlers::league::get_league))
            .route("/api/league/canGetReward", web::get().to(handlers::league::can_get_reward))
            .route("/api/league/getReward", web::post().to(handlers::league::get_reward))
            .route(
                "/api/league/findOpponent/{playerId}",
                web::get().to(handlers::league::find_opponent),
            )
    })
    .bind(config.bind_addr())?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
