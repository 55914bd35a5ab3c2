// Roster entries and the drag-and-drop payload boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{normalize_position, Role};

/// A roster entry as delivered by the backend.
///
/// `name` identifies the player within one team's roster only; two clubs may
/// field players with the same name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Free-text position category ("Defender", "striker", ...).
    #[serde(default)]
    pub position: String,
    /// Expected 1-99, not enforced.
    #[serde(default)]
    pub rating: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, position: impl Into<String>, rating: f64) -> Self {
        Player {
            name: name.into(),
            position: position.into(),
            rating,
        }
    }

    /// The player's natural role, if the position text is recognizable.
    pub fn natural_role(&self) -> Option<Role> {
        normalize_position(&self.position)
    }
}

/// Why a drag payload could not be turned into a `Player`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvalidPayload {
    #[error("drag payload is empty")]
    Empty,

    #[error("drag payload is not a player object: {0}")]
    Malformed(String),

    #[error("drag payload has an empty player name")]
    MissingName,

    #[error("drag payload rating is not a finite number")]
    BadRating,
}

/// Raw shape accepted across the drag boundary. Everything is optional so
/// that validation can report a precise reason.
#[derive(Debug, Deserialize)]
struct RawPayload {
    name: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    rating: Option<serde_json::Value>,
}

/// Parse and validate a serialized player carried by a drag-and-drop event.
pub fn parse_drag_payload(raw: &str) -> Result<Player, InvalidPayload> {
    if raw.trim().is_empty() {
        return Err(InvalidPayload::Empty);
    }

    let payload: RawPayload =
        serde_json::from_str(raw).map_err(|e| InvalidPayload::Malformed(e.to_string()))?;

    // Names are matched against the roster verbatim, so only blank ones are
    // rejected.
    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(InvalidPayload::MissingName)?;

    let rating = match payload.rating {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(serde_json::Value::Number(n)) => n.as_f64().ok_or(InvalidPayload::BadRating)?,
        // Rosters occasionally carry ratings as strings ("84").
        Some(serde_json::Value::String(s)) => {
            s.trim().parse::<f64>().map_err(|_| InvalidPayload::BadRating)?
        }
        Some(_) => return Err(InvalidPayload::BadRating),
    };
    if !rating.is_finite() {
        return Err(InvalidPayload::BadRating);
    }

    Ok(Player {
        name,
        position: payload.position.unwrap_or_default(),
        rating,
    })
}

/// Serialize a player for the drag boundary.
pub fn drag_payload(player: &Player) -> String {
    serde_json::to_string(player).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_payload() {
        let p = parse_drag_payload(r#"{"name":"Bukayo Saka","position":"Forward","rating":87}"#)
            .unwrap();
        assert_eq!(p.name, "Bukayo Saka");
        assert_eq!(p.position, "Forward");
        assert_eq!(p.rating, 87.0);
        assert_eq!(p.natural_role(), Some(Role::Attack));
    }

    #[test]
    fn accepts_string_rating() {
        let p = parse_drag_payload(r#"{"name":"A","position":"Defender","rating":"71"}"#).unwrap();
        assert_eq!(p.rating, 71.0);
    }

    #[test]
    fn missing_position_is_allowed() {
        let p = parse_drag_payload(r#"{"name":"Unknown Trialist","rating":55}"#).unwrap();
        assert!(p.position.is_empty());
        assert_eq!(p.natural_role(), None);
    }

    #[test]
    fn rejects_empty_payload() {
        assert_eq!(parse_drag_payload("   "), Err(InvalidPayload::Empty));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_drag_payload("not json"),
            Err(InvalidPayload::Malformed(_))
        ));
        assert!(matches!(
            parse_drag_payload("[1,2,3]"),
            Err(InvalidPayload::Malformed(_))
        ));
    }

    #[test]
    fn rejects_missing_or_blank_name() {
        assert_eq!(
            parse_drag_payload(r#"{"position":"Defender","rating":70}"#),
            Err(InvalidPayload::MissingName)
        );
        assert_eq!(
            parse_drag_payload(r#"{"name":"  ","rating":70}"#),
            Err(InvalidPayload::MissingName)
        );
    }

    #[test]
    fn rejects_bad_rating() {
        assert_eq!(
            parse_drag_payload(r#"{"name":"A","rating":"high"}"#),
            Err(InvalidPayload::BadRating)
        );
        assert_eq!(
            parse_drag_payload(r#"{"name":"A","rating":[1]}"#),
            Err(InvalidPayload::BadRating)
        );
    }

    #[test]
    fn drag_payload_round_trips() {
        let p = Player::new("Declan Rice", "Midfielder", 86.0);
        assert_eq!(parse_drag_payload(&drag_payload(&p)).unwrap(), p);
    }

    #[test]
    fn padded_roster_name_survives_round_trip() {
        let p = Player::new(" Saka ", "Forward", 88.0);
        assert_eq!(parse_drag_payload(&drag_payload(&p)).unwrap().name, " Saka ");
    }
}
