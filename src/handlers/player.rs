use crate::db::Db;
use crate::error::AppError;
use crate::models::player::*;
use crate::services::player as service;
use crate::validation;
use ntex::http::StatusCode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn create_player(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let player = service::create_player(&db, validation::parse_body(&body)?)?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(&PlayerMessage {
        message: "Player created successfully",
        player,
    }))
}

pub async fn list_players(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let players = service::list_players(&db)?;
    Ok(HttpResponse::Ok().json(&players))
}

pub async fn get_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = validation::parse_id("id", Some(path.as_str()))?;
    let player = service::get_player(&db, id)?;
    Ok(HttpResponse::Ok().json(&player))
}

pub async fn update_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let id = validation::parse_id("id", Some(path.as_str()))?;
    let player = service::update_player(&db, id, validation::parse_body(&body)?)?;
    Ok(HttpResponse::Ok().json(&PlayerMessage {
        message: "Player updated successfully",
        player,
    }))
}

pub async fn delete_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = validation::parse_id("id", Some(path.as_str()))?;
    service::delete_player(&db, id)?;
    Ok(HttpResponse::Ok().json(&serde_json::json!({ "message": "Player deleted successfully" })))
}
