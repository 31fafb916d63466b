use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

/// Domain failures of the weekly league.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LeagueError {
    #[error("Player has not done at least 10 battles")]
    InsufficientBattles,
    #[error("Reward already claimed.")]
    AlreadyClaimed,
    #[error("Player cannot have the reward")]
    NotYetEligible,
    #[error("No equippable item blueprint available for level {0}")]
    NoEligibleBlueprint(i64),
    #[error("Rarity {0} is not configured")]
    RarityNotConfigured(&'static str),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    League(#[from] LeagueError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::League(e) => match e {
                LeagueError::InsufficientBattles => StatusCode::PRECONDITION_FAILED,
                LeagueError::AlreadyClaimed => StatusCode::PAYLOAD_TOO_LARGE,
                LeagueError::NotYetEligible => StatusCode::URI_TOO_LONG,
                LeagueError::NoEligibleBlueprint(_) => StatusCode::BAD_REQUEST,
                LeagueError::RarityNotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// The message exposed to clients. Storage and seed-data faults stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Db(_) => "Database error".into(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::League(LeagueError::RarityNotConfigured(_)) => "Internal error".into(),
            AppError::League(e) => e.to_string(),
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(&serde_json::json!({ "message": self.public_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_errors_keep_client_status_codes() {
        let cases = [
            (LeagueError::InsufficientBattles, 412),
            (LeagueError::AlreadyClaimed, 413),
            (LeagueError::NotYetEligible, 414),
            (LeagueError::NoEligibleBlueprint(3), 400),
            (LeagueError::RarityNotConfigured("Epic"), 500),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).status().as_u16(), code);
        }
    }

    #[test]
    fn test_generic_errors() {
        assert_eq!(AppError::Validation("playerId".into()).status().as_u16(), 422);
        assert_eq!(AppError::NotFound("Player not found".into()).status().as_u16(), 404);
        let db = AppError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(db.status().as_u16(), 500);
        assert_eq!(db.public_message(), "Database error");
    }

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(
            AppError::from(LeagueError::AlreadyClaimed).public_message(),
            "Reward already claimed."
        );
        assert_eq!(
            AppError::from(LeagueError::RarityNotConfigured("Legendary")).public_message(),
            "Internal error"
        );
    }
}
