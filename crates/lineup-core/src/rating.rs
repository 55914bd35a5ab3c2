// Position-adjusted team rating.
//
// Each assigned player contributes their raw rating scaled by a penalty when
// the slot's role differs from their natural position. Players whose position
// text cannot be normalized are excluded rather than defaulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentMap;
use crate::player::Player;
use crate::position::Role;

/// Penalty multipliers for out-of-position players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPolicy {
    /// Applied when an outfield player is put in goal. `1.0` exempts the
    /// goalkeeper slot from any penalty.
    pub goalkeeper_multiplier: f64,
    /// Applied to every other role mismatch.
    pub cross_position_multiplier: f64,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        RatingPolicy {
            goalkeeper_multiplier: 0.5,
            cross_position_multiplier: 0.8,
        }
    }
}

/// Aggregate rating for one side's current assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub per_role_totals: BTreeMap<Role, f64>,
    pub per_role_counts: BTreeMap<Role, usize>,
    /// Sum of adjusted ratings, rounded to two decimals.
    pub total: f64,
    /// Mean adjusted rating, rounded to two decimals; `0.0` when empty.
    pub average: f64,
    /// Assigned names with no matching roster entry.
    pub missing: Vec<String>,
    /// Assigned players skipped because their position is unrecognized.
    pub excluded: Vec<String>,
}

impl TeamRating {
    /// Number of players that counted toward the average.
    pub fn rated_count(&self) -> usize {
        self.per_role_counts.values().sum()
    }
}

/// A player's rating after the out-of-position penalty for `assigned`.
///
/// Returns `None` when the player's natural position is unrecognized.
pub fn adjusted_rating(player: &Player, assigned: Role, policy: &RatingPolicy) -> Option<f64> {
    let natural = player.natural_role()?;
    let adjusted = if natural == assigned {
        player.rating
    } else if assigned == Role::Goalkeeper {
        player.rating * policy.goalkeeper_multiplier
    } else {
        player.rating * policy.cross_position_multiplier
    };
    Some(adjusted)
}

/// Compute per-role totals, counts, and the team average.
///
/// Slot indices without a role (stale indices from another formation) are
/// ignored.
pub fn team_rating(
    assigned: &AssignmentMap,
    roster: &[Player],
    roles: &[Role],
    policy: &RatingPolicy,
) -> TeamRating {
    let mut rating = TeamRating::default();
    let mut total = 0.0;
    let mut count = 0usize;

    for (&slot, name) in assigned {
        let Some(&role) = roles.get(slot) else {
            continue;
        };
        let Some(player) = roster.iter().find(|p| &p.name == name) else {
            rating.missing.push(name.clone());
            continue;
        };
        let Some(adjusted) = adjusted_rating(player, role, policy) else {
            rating.excluded.push(name.clone());
            continue;
        };

        *rating.per_role_totals.entry(role).or_insert(0.0) += adjusted;
        *rating.per_role_counts.entry(role).or_insert(0) += 1;
        total += adjusted;
        count += 1;
    }

    rating.total = round2(total);
    rating.average = if count > 0 {
        round2(total / count as f64)
    } else {
        0.0
    };
    rating
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
