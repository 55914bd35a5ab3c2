// User-built teams: a named eleven created from a side of the board.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assignment::TeamSide;
use crate::player::Player;

/// Players in a custom team.
pub const CUSTOM_TEAM_SIZE: usize = 11;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomTeamError {
    #[error("team name is required")]
    MissingName,

    #[error("a custom team needs {expected} players, found {found}")]
    WrongSize { expected: usize, found: usize },

    #[error("player {0} name is required")]
    MissingPlayerName(usize),

    #[error("player {0} position is required")]
    MissingPosition(usize),

    #[error("player {0} rating must be 1-99")]
    BadRating(usize),

    #[error("player {0:?} appears more than once")]
    DuplicatePlayer(String),
}

/// A validated custom team. A rating of `0.0` means unrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTeam {
    pub name: String,
    pub players: Vec<Player>,
}

impl CustomTeam {
    /// Validate and normalize a team. Names and positions are trimmed;
    /// player numbers in errors are 1-based.
    pub fn new(name: &str, players: Vec<Player>) -> Result<Self, CustomTeamError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CustomTeamError::MissingName);
        }
        if players.len() != CUSTOM_TEAM_SIZE {
            return Err(CustomTeamError::WrongSize {
                expected: CUSTOM_TEAM_SIZE,
                found: players.len(),
            });
        }

        let mut normalized: Vec<Player> = Vec::with_capacity(players.len());
        for (i, player) in players.into_iter().enumerate() {
            let number = i + 1;
            let player_name = player.name.trim();
            if player_name.is_empty() {
                return Err(CustomTeamError::MissingPlayerName(number));
            }
            let position = player.position.trim();
            if position.is_empty() {
                return Err(CustomTeamError::MissingPosition(number));
            }
            let rating = player.rating;
            if rating != 0.0 && !(1.0..=99.0).contains(&rating) {
                return Err(CustomTeamError::BadRating(number));
            }
            if normalized.iter().any(|p| p.name == player_name) {
                return Err(CustomTeamError::DuplicatePlayer(player_name.to_string()));
            }
            normalized.push(Player::new(player_name, position, rating));
        }

        Ok(CustomTeam {
            name: name.to_string(),
            players: normalized,
        })
    }

    /// The side's starting eleven in slot order. Every slot must be filled.
    pub fn from_side(name: &str, side: &TeamSide) -> Result<Self, CustomTeamError> {
        let players = side
            .assigned()
            .keys()
            .filter_map(|slot| side.player_at(*slot).cloned())
            .collect();
        CustomTeam::new(name, players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Orientation;
    use crate::formation::Formation;
    use crate::rating::RatingPolicy;

    fn eleven() -> Vec<Player> {
        let mut players = vec![Player::new("Keeper", "Goalkeeper", 80.0)];
        players.extend(
            (1..CUSTOM_TEAM_SIZE).map(|i| Player::new(format!("Player {i}"), "Midfielder", 70.0)),
        );
        players
    }

    #[test]
    fn valid_team_is_trimmed() {
        let mut players = eleven();
        players[3] = Player::new("  Rice ", " Midfielder ", 0.0);
        let team = CustomTeam::new("  Dream XI ", players).unwrap();
        assert_eq!(team.name, "Dream XI");
        assert_eq!(team.players[3], Player::new("Rice", "Midfielder", 0.0));
    }

    #[test]
    fn rejects_bad_input_with_player_number() {
        assert_eq!(CustomTeam::new(" ", eleven()), Err(CustomTeamError::MissingName));
        assert_eq!(
            CustomTeam::new("XI", eleven()[..10].to_vec()),
            Err(CustomTeamError::WrongSize { expected: 11, found: 10 })
        );

        let mut players = eleven();
        players[4].name = " ".into();
        assert_eq!(CustomTeam::new("XI", players), Err(CustomTeamError::MissingPlayerName(5)));

        let mut players = eleven();
        players[0].position.clear();
        assert_eq!(CustomTeam::new("XI", players), Err(CustomTeamError::MissingPosition(1)));

        let mut players = eleven();
        players[10].rating = 120.0;
        assert_eq!(CustomTeam::new("XI", players), Err(CustomTeamError::BadRating(11)));

        let mut players = eleven();
        players[2].name = "Keeper".into();
        assert_eq!(
            CustomTeam::new("XI", players),
            Err(CustomTeamError::DuplicatePlayer("Keeper".into()))
        );
    }

    #[test]
    fn from_side_takes_the_full_eleven_in_slot_order() {
        let mut side = TeamSide::new(Orientation::Top, Formation::FourThreeThree, RatingPolicy::default());
        side.reset(Some("Arsenal".into()), eleven());
        assert_eq!(
            CustomTeam::from_side("XI", &side),
            Err(CustomTeamError::WrongSize { expected: 11, found: 0 })
        );

        let slots = side.slots().to_vec();
        for (slot, player) in slots.iter().zip(eleven()) {
            side.resolve_drop(slot.point, &player);
        }
        let team = CustomTeam::from_side("XI", &side).unwrap();
        assert_eq!(team.players.len(), CUSTOM_TEAM_SIZE);
        assert_eq!(team.players[0].name, "Keeper");

        side.remove_player(0);
        assert!(CustomTeam::from_side("XI", &side).is_err());
    }
}
