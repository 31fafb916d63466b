use crate::db::Db;
use crate::error::AppError;
use crate::models::league::*;
use crate::services::league::{gate, opponent, ranking};
use crate::validation;
use ntex::util::Bytes;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn can_get_reward(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<PlayerIdQuery>,
) -> Result<HttpResponse, AppError> {
    let player_id = validation::parse_id("playerId", query.player_id.as_deref())?;
    validation::validate_existing_player(&db, "playerId", player_id)?;
    let position = gate::check_eligibility(&db, player_id)?;
    Ok(HttpResponse::Ok().json(&EligibilityResponse {
        message: "Player can have the reward",
        position,
    }))
}

pub async fn get_reward(
    db: web::types::State<Arc<Db>>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let req: RewardRequest = validation::parse_body(&body)?;
    let player_id = validation::require("playerId", req.player_id)?;
    validation::validate_existing_player(&db, "playerId", player_id)?;
    let claimed = gate::claim(&db, player_id)?;
    Ok(HttpResponse::Ok().json(&RewardResponse {
        message: "Reward claimed successfully.",
        reward: claimed.reward,
    }))
}

pub async fn get_league(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<PlayerIdQuery>,
) -> Result<HttpResponse, AppError> {
    let caller = match query.player_id.as_deref() {
        Some(raw) => Some(validation::parse_id("playerId", Some(raw))?),
        None => None,
    };
    let standing = ranking::league_standing(&db, caller)?;
    Ok(HttpResponse::Ok().json(&standing))
}

pub async fn find_opponent(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let player_id = validation::parse_id("playerId", Some(path.as_str()))?;
    let opponent = opponent::find_opponent(&db, player_id)?;
    Ok(HttpResponse::Ok().json(&opponent))
}
