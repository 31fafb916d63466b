use crate::db::Db;
use crate::error::AppError;
use crate::models::item::*;
use crate::services::item as service;
use crate::validation;
use ntex::http::StatusCode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_items(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let items = service::list_items(&db)?;
    Ok(HttpResponse::Ok().json(&items))
}

pub async fn get_item(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = validation::parse_id("id", Some(path.as_str()))?;
    let item = service::get_item(&db, id)?;
    Ok(HttpResponse::Ok().json(&item))
}

pub async fn create_random_item(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let item = service::create_random_item(&db, validation::parse_body(&body)?)?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(&item))
}

pub async fn transfer_item(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let id = validation::parse_id("id", Some(path.as_str()))?;
    let item = service::transfer_item(&db, id, validation::parse_body(&body)?)?;
    Ok(HttpResponse::Ok().json(&item))
}

pub async fn get_inventory(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<InventoryQuery>,
) -> Result<HttpResponse, AppError> {
    let owner_id = validation::parse_id("ownerId", query.owner_id.as_deref())?;
    validation::validate_existing_player(&db, "ownerId", owner_id)?;
    let item_type = validation::validate_item_type(query.item_type.as_deref())?;
    let items = service::inventory(&db, owner_id, item_type)?;
    Ok(HttpResponse::Ok().json(&items))
}

pub async fn list_rarities(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let rarities = service::list_rarities(&db)?;
    Ok(HttpResponse::Ok().json(&rarities))
}
