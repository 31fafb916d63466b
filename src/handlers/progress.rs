use crate::db::Db;
use crate::error::AppError;
use crate::models::league::PlayerIdQuery;
use crate::services::progress as service;
use crate::validation;
use ntex::http::StatusCode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_completed_quests(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<PlayerIdQuery>,
) -> Result<HttpResponse, AppError> {
    let player_id = validation::parse_id("playerId", query.player_id.as_deref())?;
    let quests = service::completed_quests(&db, player_id)?;
    Ok(HttpResponse::Ok().json(&quests))
}

pub async fn create_completed_quest(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let quest = service::record_quest(&db, validation::parse_body(&body)?)?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(&quest))
}

pub async fn list_collected_pois(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<PlayerIdQuery>,
) -> Result<HttpResponse, AppError> {
    let player_id = validation::parse_id("playerId", query.player_id.as_deref())?;
    let pois = service::collected_pois(&db, player_id)?;
    Ok(HttpResponse::Ok().json(&pois))
}

pub async fn create_collected_poi(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let poi = service::collect_poi(&db, validation::parse_body(&body)?)?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(&poi))
}
