// Two-sided match board and the prediction request built from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assignment::{AssignmentMap, Orientation, TeamSide};
use crate::formation::Formation;
use crate::player::Player;
use crate::rating::RatingPolicy;

/// Which team side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn other(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Pitch half this side defends on the vertical board.
    pub fn orientation(&self) -> Orientation {
        match self {
            Side::Left => Orientation::Top,
            Side::Right => Orientation::Bottom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Stable index into per-side arrays.
    pub fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outbound prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub team_a: String,
    pub team_b: String,
    pub left_formation: Formation,
    pub right_formation: Formation,
    pub left_playing_11: AssignmentMap,
    pub right_playing_11: AssignmentMap,
    pub left_rating: f64,
    pub right_rating: f64,
}

/// Prediction response from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub winner: String,
}

/// Both team sides. Each side owns its own slots and partitions; the board
/// only offers read-only views across them.
#[derive(Debug, Clone)]
pub struct MatchBoard {
    left: TeamSide,
    right: TeamSide,
}

impl MatchBoard {
    pub fn new(formation: Formation, policy: RatingPolicy) -> Self {
        MatchBoard {
            left: TeamSide::new(Side::Left.orientation(), formation, policy),
            right: TeamSide::new(Side::Right.orientation(), formation, policy),
        }
    }

    pub fn side(&self, side: Side) -> &TeamSide {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut TeamSide {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Combined roster of both sides, left first, for rendering lookups.
    pub fn player_lookup(&self) -> Vec<&Player> {
        self.left
            .roster()
            .iter()
            .chain(self.right.roster().iter())
            .collect()
    }

    /// Build a prediction request. `None` until both sides have a team.
    pub fn prediction_request(&self) -> Option<PredictionRequest> {
        let team_a = self.left.team()?.to_string();
        let team_b = self.right.team()?.to_string();
        Some(PredictionRequest {
            team_a,
            team_b,
            left_formation: self.left.formation(),
            right_formation: self.right.formation(),
            left_playing_11: self.left.assigned().clone(),
            right_playing_11: self.right.assigned().clone(),
            left_rating: self.left.rating().average,
            right_rating: self.right.rating().average,
        })
    }
}

impl Default for MatchBoard {
    fn default() -> Self {
        MatchBoard::new(Formation::default(), RatingPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::PitchPoint;

    fn board() -> MatchBoard {
        let mut b = MatchBoard::default();
        b.side_mut(Side::Left).reset(
            Some("Arsenal".into()),
            vec![
                Player::new("Raya", "Goalkeeper", 85.0),
                Player::new("Saka", "Forward", 88.0),
            ],
        );
        b.side_mut(Side::Right).reset(
            Some("Chelsea".into()),
            vec![Player::new("Palmer", "Midfielder", 87.0)],
        );
        b
    }

    #[test]
    fn sides_have_opposite_orientation() {
        let b = MatchBoard::default();
        assert_eq!(b.side(Side::Left).orientation(), Orientation::Top);
        assert_eq!(b.side(Side::Right).orientation(), Orientation::Bottom);
        assert_eq!(Side::Left.other(), Side::Right);
    }

    #[test]
    fn sides_are_independent() {
        let mut b = board();
        b.side_mut(Side::Left)
            .resolve_drop(PitchPoint::new(50.0, 5.0), &Player::new("Raya", "Goalkeeper", 85.0));
        assert_eq!(b.side(Side::Left).assigned().len(), 1);
        assert!(b.side(Side::Right).assigned().is_empty());
        assert_eq!(b.side(Side::Right).available().len(), 1);
    }

    #[test]
    fn player_lookup_combines_rosters() {
        let b = board();
        let names: Vec<&str> = b.player_lookup().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Raya", "Saka", "Palmer"]);
    }

    #[test]
    fn prediction_request_requires_both_teams() {
        let mut b = board();
        assert!(b.prediction_request().is_some());
        b.side_mut(Side::Right).reset(None, Vec::new());
        assert!(b.prediction_request().is_none());
    }

    #[test]
    fn prediction_request_wire_shape() {
        let mut b = board();
        b.side_mut(Side::Left)
            .resolve_drop(PitchPoint::new(50.0, 5.0), &Player::new("Raya", "Goalkeeper", 85.0));
        let req = b.prediction_request().unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["team_a"], "Arsenal");
        assert_eq!(json["team_b"], "Chelsea");
        assert_eq!(json["left_formation"], "4-3-3");
        assert_eq!(json["left_playing_11"]["0"], "Raya");
        assert_eq!(json["left_rating"], 85.0);
        assert_eq!(json["right_rating"], 0.0);
        assert!(json["right_playing_11"].as_object().unwrap().is_empty());
    }
}
