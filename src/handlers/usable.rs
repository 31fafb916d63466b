use crate::db::Db;
use crate::error::AppError;
use crate::models::usable::OwnerQuery;
use crate::services::usable as service;
use crate::validation;
use ntex::http::StatusCode;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn list_usable_items(db: web::types::State<Arc<Db>>) -> Result<HttpResponse, AppError> {
    let items = service::list_usable_items(&db)?;
    Ok(HttpResponse::Ok().json(&items))
}

pub async fn usable_items_of_owner(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<OwnerQuery>,
) -> Result<HttpResponse, AppError> {
    let owner_id = validation::parse_id("ownerId", query.owner_id.as_deref())?;
    let stacks = service::usable_items_of(&db, owner_id)?;
    Ok(HttpResponse::Ok().json(&stacks))
}

pub async fn create_random_usable_item(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let grant = service::grant_random_usable_item(&db, validation::parse_body(&body)?)?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(&grant))
}
