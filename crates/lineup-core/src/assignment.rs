// Slot assignment for one team side.
//
// Every roster player lives in exactly one of three partitions: the available
// list, the assignment map (slot -> name), or the bench. All mutations below
// preserve that partition and recompute the side's rating before returning.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::formation::{layout_for, mirror_vertical, Formation, PitchPoint, Slot};
use crate::player::{parse_drag_payload, InvalidPayload, Player};
use crate::position::Role;
use crate::rating::{team_rating, RatingPolicy, TeamRating};

/// Slot index -> player name for one side.
pub type AssignmentMap = BTreeMap<usize, String>;

/// Which half of a vertical pitch a side defends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Own goal at y = 0; uses the canonical layout.
    Top,
    /// Own goal at y = 100; uses the mirrored layout.
    Bottom,
}

/// Index of the slot closest to `point`, or `None` when there are no slots.
///
/// Ties go to the first slot encountered. There is no distance cutoff.
pub fn nearest_slot(point: PitchPoint, slots: &[Slot]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for slot in slots {
        let dist = point.distance(&slot.point);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((slot.index, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Result of dropping a player onto the pitch.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Player placed from the available list or bench. `displaced` names the
    /// previous occupant, now on the bench.
    Placed {
        slot: usize,
        displaced: Option<String>,
    },
    /// Player was already on the pitch and moved to another slot.
    Moved {
        from: usize,
        to: usize,
        displaced: Option<String>,
    },
    /// Player was re-dropped onto the slot they already hold.
    Unchanged { slot: usize },
    /// The formation has no slots.
    NoSlots,
    /// The player is not part of this side's roster.
    UnknownPlayer(String),
    /// The drag payload could not be parsed.
    InvalidPayload(InvalidPayload),
}

impl DropOutcome {
    /// Whether the drop changed the side's state.
    pub fn changed(&self) -> bool {
        matches!(self, DropOutcome::Placed { .. } | DropOutcome::Moved { .. })
    }
}

/// Where a roster player currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Available,
    Assigned(usize),
    Bench,
}

/// One team's board: formation slots, roster partitions, and rating.
#[derive(Debug, Clone)]
pub struct TeamSide {
    team: Option<String>,
    formation: Formation,
    orientation: Orientation,
    slots: Vec<Slot>,
    roles: Vec<Role>,
    roster: Vec<Player>,
    available: Vec<Player>,
    assigned: AssignmentMap,
    bench: Vec<Player>,
    rating: TeamRating,
    policy: RatingPolicy,
}

impl TeamSide {
    /// Create an empty side with no team selected.
    pub fn new(orientation: Orientation, formation: Formation, policy: RatingPolicy) -> Self {
        let mut side = TeamSide {
            team: None,
            formation,
            orientation,
            slots: Vec::new(),
            roles: Vec::new(),
            roster: Vec::new(),
            available: Vec::new(),
            assigned: AssignmentMap::new(),
            bench: Vec::new(),
            rating: TeamRating::default(),
            policy,
        };
        side.regenerate_slots();
        side
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn available(&self) -> &[Player] {
        &self.available
    }

    pub fn assigned(&self) -> &AssignmentMap {
        &self.assigned
    }

    pub fn bench(&self) -> &[Player] {
        &self.bench
    }

    pub fn rating(&self) -> &TeamRating {
        &self.rating
    }

    pub fn policy(&self) -> &RatingPolicy {
        &self.policy
    }

    /// The roster entry occupying `slot`, if any.
    pub fn player_at(&self, slot: usize) -> Option<&Player> {
        let name = self.assigned.get(&slot)?;
        self.roster_player(name)
    }

    /// Which partition holds the named player.
    pub fn placement_of(&self, name: &str) -> Option<Placement> {
        if let Some((&slot, _)) = self.assigned.iter().find(|(_, n)| n.as_str() == name) {
            return Some(Placement::Assigned(slot));
        }
        if self.available.iter().any(|p| p.name == name) {
            return Some(Placement::Available);
        }
        if self.bench.iter().any(|p| p.name == name) {
            return Some(Placement::Bench);
        }
        None
    }

    // -----------------------------------------------------------------------
    // Reset contract
    // -----------------------------------------------------------------------

    /// Select a team and load its roster.
    ///
    /// Clears the assignment map and bench and refills the available list with
    /// the full roster in one step. Duplicate names keep their first entry.
    pub fn reset(&mut self, team: Option<String>, roster: Vec<Player>) {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(roster.len());
        for player in roster {
            if seen.insert(player.name.clone()) {
                unique.push(player);
            } else {
                warn!(
                    "Duplicate player name '{}' in roster for {:?}, keeping first entry",
                    player.name, team
                );
            }
        }

        info!(
            "Resetting {:?} side: team={:?}, {} players",
            self.orientation,
            team,
            unique.len()
        );
        self.team = team;
        self.roster = unique;
        self.clear_assignments();
    }

    /// Switch formation. All assignments are cleared because slot indices
    /// change meaning.
    pub fn set_formation(&mut self, formation: Formation) {
        info!(
            "{:?} side formation {} -> {}",
            self.orientation, self.formation, formation
        );
        self.formation = formation;
        self.regenerate_slots();
        self.clear_assignments();
    }

    /// Replace the rating policy and recompute.
    pub fn set_policy(&mut self, policy: RatingPolicy) {
        self.policy = policy;
        self.recompute();
    }

    fn regenerate_slots(&mut self) {
        let layout = layout_for(self.formation);
        self.slots = match self.orientation {
            Orientation::Top => layout.slots,
            Orientation::Bottom => mirror_vertical(&layout.slots),
        };
        self.roles = layout.roles;
    }

    fn clear_assignments(&mut self) {
        self.assigned.clear();
        self.bench.clear();
        self.available = self.roster.clone();
        self.recompute();
    }

    // -----------------------------------------------------------------------
    // Drop / remove
    // -----------------------------------------------------------------------

    /// Parse a drag payload and drop the player at `point`.
    ///
    /// Invalid payloads are logged and leave the side untouched.
    pub fn drop_payload(&mut self, point: PitchPoint, raw: &str) -> DropOutcome {
        match parse_drag_payload(raw) {
            Ok(player) => self.resolve_drop(point, &player),
            Err(e) => {
                warn!("Ignoring drop with invalid payload: {}", e);
                DropOutcome::InvalidPayload(e)
            }
        }
    }

    /// Drop `player` at `point` (already in this side's percentage space).
    ///
    /// The nearest slot receives the player. A different occupant is moved to
    /// the end of the bench. The dropped player leaves whichever partition
    /// held them.
    pub fn resolve_drop(&mut self, point: PitchPoint, player: &Player) -> DropOutcome {
        let Some(target) = nearest_slot(point, &self.slots) else {
            debug!("Drop ignored: formation has no slots");
            return DropOutcome::NoSlots;
        };

        let name = player.name.as_str();
        let previous = match self.placement_of(name) {
            Some(p) => p,
            None => {
                warn!(
                    "Drop ignored: '{}' is not on the {:?} side's roster",
                    name, self.orientation
                );
                return DropOutcome::UnknownPlayer(name.to_string());
            }
        };

        if previous == Placement::Assigned(target) {
            return DropOutcome::Unchanged { slot: target };
        }

        if let Placement::Assigned(from) = previous {
            self.assigned.remove(&from);
        }

        let displaced = match self.assigned.insert(target, name.to_string()) {
            Some(occupant) => {
                let benched = self
                    .roster_player(&occupant)
                    .cloned()
                    .unwrap_or_else(|| Player::new(occupant.clone(), "", 0.0));
                self.bench.push(benched);
                Some(occupant)
            }
            None => None,
        };

        self.available.retain(|p| p.name != name);
        self.bench.retain(|p| p.name != name);
        self.recompute();

        info!(
            "Dropped '{}' into slot {} ({:?} side), displaced={:?}, avg={:.2}",
            name, target, self.orientation, displaced, self.rating.average
        );

        match previous {
            Placement::Assigned(from) => DropOutcome::Moved {
                from,
                to: target,
                displaced,
            },
            _ => DropOutcome::Placed {
                slot: target,
                displaced,
            },
        }
    }

    /// Clear `slot` and return its player to the available list.
    pub fn remove_player(&mut self, slot: usize) -> Option<Player> {
        let name = self.assigned.remove(&slot)?;
        let player = self
            .roster_player(&name)
            .cloned()
            .unwrap_or_else(|| Player::new(name.clone(), "", 0.0));
        self.available.push(player.clone());
        self.recompute();
        info!(
            "Removed '{}' from slot {} ({:?} side), avg={:.2}",
            name, slot, self.orientation, self.rating.average
        );
        Some(player)
    }

    fn roster_player(&self, name: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.name == name)
    }

    fn recompute(&mut self) {
        self.rating = team_rating(&self.assigned, &self.roster, &self.roles, &self.policy);
    }
}
