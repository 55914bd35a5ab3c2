// Pitch roles and normalization of free-text roster positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a formation slot asks its occupant to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Goalkeeper,
    Defense,
    Midfield,
    Attack,
}

impl Role {
    /// All roles in slot order (goalkeeper first, attack last).
    pub const ALL: [Role; 4] = [Role::Goalkeeper, Role::Defense, Role::Midfield, Role::Attack];

    /// Lowercase label used on the wire and in the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "goalkeeper",
            Role::Defense => "defense",
            Role::Midfield => "midfield",
            Role::Attack => "attack",
        }
    }

    /// Short label for dense displays.
    pub fn abbrev(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defense => "DEF",
            Role::Midfield => "MID",
            Role::Attack => "ATT",
        }
    }

    /// Stable index into per-role arrays.
    pub fn index(&self) -> usize {
        match self {
            Role::Goalkeeper => 0,
            Role::Defense => 1,
            Role::Midfield => 2,
            Role::Attack => 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a roster's free-text position onto a pitch role.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Returns
/// `None` for anything unrecognized; callers exclude such players from rating
/// aggregation instead of guessing a bucket.
pub fn normalize_position(raw: &str) -> Option<Role> {
    match raw.trim().to_lowercase().as_str() {
        "goalkeeper" | "keeper" | "goalie" | "gk" => Some(Role::Goalkeeper),
        "defender" | "defence" | "defense" | "def" | "df" | "cb" | "lb" | "rb" => {
            Some(Role::Defense)
        }
        "midfielder" | "midfield" | "mid" | "mf" | "cm" | "dm" | "am" => Some(Role::Midfield),
        "forward" | "striker" | "attacker" | "attack" | "winger" | "fw" | "fwd" | "st" => {
            Some(Role::Attack)
        }
        _ => None,
    }
}
