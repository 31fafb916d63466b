use crate::db::Db;
use crate::error::AppError;
use crate::models::item::ItemType;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;

const MAX_PLAYER_NAME_LEN: usize = 255;

/// Upper bound for stored player counters and levels; the columns hold 32-bit integers.
pub const MAX_STORED_INT: i64 = i32::MAX as i64;

pub fn require<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("The {} field is required.", field)))
}

/// Parses a required integer id from a query string or path segment.
pub fn parse_id(field: &str, raw: Option<&str>) -> Result<i64, AppError> {
    let raw = require(field, raw.map(str::trim).filter(|s| !s.is_empty()))?;
    raw.parse()
        .map_err(|_| AppError::Validation(format!("The {} field must be an integer.", field)))
}

pub fn validate_min(field: &str, value: i64, min: i64) -> Result<(), AppError> {
    if value < min {
        Err(AppError::Validation(format!(
            "The {} field must be at least {}.",
            field, min
        )))
    } else {
        Ok(())
    }
}

pub fn validate_max(field: &str, value: i64, max: i64) -> Result<(), AppError> {
    if value > max {
        Err(AppError::Validation(format!(
            "The {} field must not be greater than {}.",
            field, max
        )))
    } else {
        Ok(())
    }
}

pub fn validate_player_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation("The player name must not be empty.".into()))
    } else if trimmed.chars().count() > MAX_PLAYER_NAME_LEN {
        Err(AppError::Validation(format!(
            "The player name may not be greater than {} characters.",
            MAX_PLAYER_NAME_LEN
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims `value` and checks it is non-empty and at most `max_len` characters.
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(format!("The {} field is required.", field)))
    } else if trimmed.chars().count() > max_len {
        Err(AppError::Validation(format!(
            "The {} field must not be greater than {} characters.",
            field, max_len
        )))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Latitude and longitude must lie within `-limit..=limit` degrees.
pub fn validate_coordinate(field: &str, value: f64, limit: f64) -> Result<(), AppError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "The {} field must be between -{} and {}.",
            field, limit, limit
        )))
    }
}

/// Decodes a JSON request body. Malformed or mistyped bodies are validation failures, and an
/// empty body reads as `{}` so missing fields surface as "field is required".
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("The request body is invalid: {}", e)))
}

pub fn validate_item_type(raw: Option<&str>) -> Result<ItemType, AppError> {
    let code = parse_id("type", raw)?;
    ItemType::from_code(code)
        .ok_or_else(|| AppError::Validation("The selected type is invalid.".into()))
}

/// Rejects ids that do not name a stored player, the way request validation does
/// before a handler reaches the league services.
pub fn validate_existing_player(db: &Db, field: &str, player_id: i64) -> Result<(), AppError> {
    let found = db.with_conn(|conn| {
        conn.query_row(
            "SELECT 1 FROM players WHERE id = ?1",
            params![player_id],
            |_| Ok(()),
        )
        .optional()
    })?;
    match found {
        Some(()) => Ok(()),
        None => Err(AppError::Validation(format!(
            "The selected {} is invalid.",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("playerId", Some(" 42 ")).unwrap(), 42);
        assert!(matches!(
            parse_id("playerId", None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_id("playerId", Some("")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_id("playerId", Some("abc")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_bounds() {
        assert!(validate_min("level", 1, 1).is_ok());
        assert!(validate_min("level", 0, 1).is_err());
        assert!(validate_max("nBattles", MAX_STORED_INT, MAX_STORED_INT).is_ok());
        assert!(matches!(
            validate_max("nBattles", 5_000_000_000, MAX_STORED_INT),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_player_name_rules() {
        assert_eq!(validate_player_name("  Aria ").unwrap(), "Aria");
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_text_and_coordinates() {
        assert_eq!(validate_text("name", " Dragon Hunt ", 255).unwrap(), "Dragon Hunt");
        assert!(validate_text("name", "", 255).is_err());
        assert!(validate_text("name", "abcd", 3).is_err());
        assert!(validate_coordinate("latitude", -90.0, 90.0).is_ok());
        assert!(validate_coordinate("latitude", 90.5, 90.0).is_err());
        assert!(validate_coordinate("longitude", f64::NAN, 180.0).is_err());
    }

    #[test]
    fn test_parse_body() {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Body {
            player_id: Option<i64>,
        }

        let parsed: Body = parse_body(br#"{"playerId": 5}"#).unwrap();
        assert_eq!(parsed.player_id, Some(5));
        let empty: Body = parse_body(b"  ").unwrap();
        assert_eq!(empty.player_id, None);
        assert!(matches!(
            parse_body::<Body>(br#"{"playerId": "5"}"#),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_body::<Body>(b"{not json"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_item_type() {
        assert_eq!(validate_item_type(Some("3")).unwrap(), ItemType::Rune);
        assert!(validate_item_type(Some("4")).is_err());
        assert!(validate_item_type(None).is_err());
    }

    #[test]
    fn test_existing_player() {
        let db = Db::open_in_memory().unwrap();
        assert!(matches!(
            validate_existing_player(&db, "playerId", 1),
            Err(AppError::Validation(_))
        ));
    }
}
