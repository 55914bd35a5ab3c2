// Formation table and slot layout generation.
//
// Coordinates are percentages of the pitch area a side owns:
// - x: 0 = left touchline, 100 = right touchline
// - y: 0 = own goal line, 100 = halfway/far edge
//
// The canonical layout is the "top" side. The opposing side is derived with
// `mirror_vertical`, and the horizontal compare view with `rotate_horizontal`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Role;

/// Goalkeeper slot coordinates (always slot index 0).
pub const GOALKEEPER_X: f64 = 50.0;
pub const GOALKEEPER_Y: f64 = 5.0;

/// The known formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "4-3-3")]
    FourThreeThree,
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    #[serde(rename = "3-5-2")]
    ThreeFiveTwo,
    #[serde(rename = "4-2-3-1")]
    FourTwoThreeOne,
}

/// Line sizes per formation: defense, midfield, attack[, second attack line].
static FORMATION_TABLE: [(Formation, &str, &[usize]); 4] = [
    (Formation::FourThreeThree, "4-3-3", &[4, 3, 3]),
    (Formation::FourFourTwo, "4-4-2", &[4, 4, 2]),
    (Formation::ThreeFiveTwo, "3-5-2", &[3, 5, 2]),
    (Formation::FourTwoThreeOne, "4-2-3-1", &[4, 2, 3, 1]),
];

impl Formation {
    pub const ALL: [Formation; 4] = [
        Formation::FourThreeThree,
        Formation::FourFourTwo,
        Formation::ThreeFiveTwo,
        Formation::FourTwoThreeOne,
    ];

    /// Look up a formation by identifier (e.g. "4-3-3").
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        FORMATION_TABLE
            .iter()
            .find(|(_, name, _)| *name == id)
            .map(|(f, _, _)| *f)
    }

    pub fn id(&self) -> &'static str {
        self.entry().1
    }

    /// Outfield line sizes, ordered from own goal outward.
    pub fn line_sizes(&self) -> &'static [usize] {
        self.entry().2
    }

    /// Total slot count including the goalkeeper.
    pub fn slot_count(&self) -> usize {
        1 + self.line_sizes().iter().sum::<usize>()
    }

    /// The next formation in table order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn entry(&self) -> &'static (Formation, &'static str, &'static [usize]) {
        FORMATION_TABLE
            .iter()
            .find(|(f, _, _)| f == self)
            .unwrap_or(&FORMATION_TABLE[0])
    }
}

impl Default for Formation {
    fn default() -> Self {
        Formation::FourThreeThree
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A normalized coordinate pair in percentage space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchPoint {
    #[serde(rename = "xPercent")]
    pub x: f64,
    #[serde(rename = "yPercent")]
    pub y: f64,
}

impl PitchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PitchPoint { x, y }
    }

    /// Euclidean distance in percentage-space units.
    pub fn distance(&self, other: &PitchPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One formation position on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    pub point: PitchPoint,
    pub role: Role,
}

/// Slots for a formation plus the parallel list of role labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormationLayout {
    pub slots: Vec<Slot>,
    pub roles: Vec<Role>,
}

impl FormationLayout {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Generate the layout for a formation identifier.
///
/// Unknown identifiers produce an empty layout; the UI treats "no slots" as
/// a safe degenerate state.
pub fn layout(formation_id: &str) -> FormationLayout {
    match Formation::from_id(formation_id) {
        Some(f) => layout_for(f),
        None => FormationLayout::default(),
    }
}

/// Generate the layout for a known formation.
///
/// Slot 0 is the goalkeeper; defense, midfield and attack slots follow in
/// line order. Every line after the midfield is labelled `Attack`.
pub fn layout_for(formation: Formation) -> FormationLayout {
    let lines = formation.line_sizes();
    let total_lines = lines.len();

    let mut slots = Vec::with_capacity(formation.slot_count());
    slots.push(Slot {
        index: 0,
        point: PitchPoint::new(GOALKEEPER_X, GOALKEEPER_Y),
        role: Role::Goalkeeper,
    });

    for (line_idx, &count) in lines.iter().enumerate() {
        let y = (line_idx + 1) as f64 / (total_lines + 1) as f64 * 100.0;
        let role = line_role(line_idx);
        for i in 0..count {
            let x = (i + 1) as f64 / (count + 1) as f64 * 100.0;
            slots.push(Slot {
                index: slots.len(),
                point: PitchPoint::new(x, y),
                role,
            });
        }
    }

    let roles = slots.iter().map(|s| s.role).collect();
    FormationLayout { slots, roles }
}

fn line_role(line_idx: usize) -> Role {
    match line_idx {
        0 => Role::Defense,
        1 => Role::Midfield,
        _ => Role::Attack,
    }
}

/// Reflect slots for the opposing half of a vertical pitch (`y' = 100 - y`).
pub fn mirror_vertical(slots: &[Slot]) -> Vec<Slot> {
    slots
        .iter()
        .map(|s| Slot {
            point: PitchPoint::new(s.point.x, 100.0 - s.point.y),
            ..*s
        })
        .collect()
}

/// Swap axes for a horizontal pitch (`x' = y`, `y' = 100 - x`).
pub fn rotate_horizontal(slots: &[Slot]) -> Vec<Slot> {
    slots
        .iter()
        .map(|s| Slot {
            point: PitchPoint::new(s.point.y, 100.0 - s.point.x),
            ..*s
        })
        .collect()
}

/// A user-dragged override for one slot's coordinates. Either axis may be
/// absent, in which case the formation's coordinate is kept.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FreePosition {
    #[serde(rename = "xPercent", default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(rename = "yPercent", default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Per-slot coordinate overrides keyed by slot index.
pub type FreePositions = BTreeMap<usize, FreePosition>;

/// Apply free-position overrides. Only finite override values replace the
/// formation coordinate.
pub fn apply_free_positions(slots: &[Slot], free: &FreePositions) -> Vec<Slot> {
    slots
        .iter()
        .map(|s| {
            let Some(over) = free.get(&s.index) else {
                return *s;
            };
            let x = over.x.filter(|v| v.is_finite()).unwrap_or(s.point.x);
            let y = over.y.filter(|v| v.is_finite()).unwrap_or(s.point.y);
            Slot {
                point: PitchPoint::new(x, y),
                ..*s
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_count(layout: &FormationLayout, role: Role) -> usize {
        layout.roles.iter().filter(|r| **r == role).count()
    }

    #[test]
    fn from_id_accepts_known_formations() {
        assert_eq!(Formation::from_id("4-3-3"), Some(Formation::FourThreeThree));
        assert_eq!(Formation::from_id(" 4-2-3-1 "), Some(Formation::FourTwoThreeOne));
        assert_eq!(Formation::from_id("5-4-1"), None);
        assert_eq!(Formation::from_id(""), None);
    }

    #[test]
    fn layout_433_has_eleven_slots_with_expected_roles() {
        let l = layout("4-3-3");
        assert_eq!(l.len(), 11);
        assert_eq!(l.roles.len(), 11);
        assert_eq!(l.roles[0], Role::Goalkeeper);
        assert_eq!(role_count(&l, Role::Goalkeeper), 1);
        assert_eq!(role_count(&l, Role::Defense), 4);
        assert_eq!(role_count(&l, Role::Midfield), 3);
        assert_eq!(role_count(&l, Role::Attack), 3);
    }

    #[test]
    fn layout_4231_counts_both_attack_lines() {
        let l = layout("4-2-3-1");
        assert_eq!(l.len(), 11);
        assert_eq!(role_count(&l, Role::Defense), 4);
        assert_eq!(role_count(&l, Role::Midfield), 2);
        assert_eq!(role_count(&l, Role::Attack), 4);
        // Lone striker sits on the fourth line at y = 80.
        let last = l.slots.last().unwrap();
        assert!((last.point.x - 50.0).abs() < 1e-9);
        assert!((last.point.y - 80.0).abs() < 1e-9);
    }

    #[test]
    fn layout_spacing_matches_line_formula() {
        let l = layout("4-4-2");
        // Defense line: y = 25, x = 20, 40, 60, 80
        let defense: Vec<&Slot> = l.slots.iter().filter(|s| s.role == Role::Defense).collect();
        for (slot, expected) in defense.iter().zip([20.0, 40.0, 60.0, 80.0]) {
            assert!((slot.point.x - expected).abs() < 1e-9);
        }
        assert!(defense.iter().all(|s| (s.point.y - 25.0).abs() < 1e-9));
        // Strikers: y = 75, x = 33.3, 66.6
        let attack: Vec<&Slot> = l.slots.iter().filter(|s| s.role == Role::Attack).collect();
        assert_eq!(attack.len(), 2);
        assert!((attack[0].point.x - 100.0 / 3.0).abs() < 1e-9);
        assert!((attack[1].point.y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn slot_indices_are_sequential() {
        for f in Formation::ALL {
            let l = layout_for(f);
            for (i, s) in l.slots.iter().enumerate() {
                assert_eq!(s.index, i);
                assert_eq!(s.role, l.roles[i]);
            }
        }
    }

    #[test]
    fn unknown_formation_yields_empty_layout() {
        let l = layout("9-9-9");
        assert!(l.is_empty());
        assert!(l.roles.is_empty());
    }

    #[test]
    fn goalkeeper_is_near_own_goal() {
        let l = layout("3-5-2");
        assert_eq!(l.slots[0].point, PitchPoint::new(50.0, 5.0));
    }

    #[test]
    fn mirror_reflects_y_only() {
        let l = layout("4-3-3");
        let m = mirror_vertical(&l.slots);
        assert_eq!(m[0].point, PitchPoint::new(50.0, 95.0));
        for (a, b) in l.slots.iter().zip(&m) {
            assert_eq!(a.point.x, b.point.x);
            assert_eq!(a.role, b.role);
            assert_eq!(a.index, b.index);
        }
    }

    #[test]
    fn rotate_swaps_axes() {
        let slots = vec![Slot {
            index: 0,
            point: PitchPoint::new(20.0, 5.0),
            role: Role::Goalkeeper,
        }];
        let r = rotate_horizontal(&slots);
        assert_eq!(r[0].point, PitchPoint::new(5.0, 80.0));
    }

    #[test]
    fn free_positions_override_only_given_axes() {
        let l = layout("4-3-3");
        let mut free = FreePositions::new();
        free.insert(
            1,
            FreePosition {
                x: Some(12.5),
                y: None,
            },
        );
        free.insert(
            2,
            FreePosition {
                x: Some(f64::NAN),
                y: Some(33.0),
            },
        );
        let out = apply_free_positions(&l.slots, &free);
        assert_eq!(out[1].point.x, 12.5);
        assert_eq!(out[1].point.y, l.slots[1].point.y);
        assert_eq!(out[2].point.x, l.slots[2].point.x);
        assert_eq!(out[2].point.y, 33.0);
        assert_eq!(out[0], l.slots[0]);
    }

    #[test]
    fn next_cycles_through_all_formations() {
        let mut f = Formation::FourThreeThree;
        let mut seen = vec![f];
        for _ in 0..3 {
            f = f.next();
            seen.push(f);
        }
        assert_eq!(seen, Formation::ALL.to_vec());
        assert_eq!(f.next(), Formation::FourThreeThree);
    }

    #[test]
    fn formation_serializes_as_id() {
        let json = serde_json::to_string(&Formation::ThreeFiveTwo).unwrap();
        assert_eq!(json, "\"3-5-2\"");
        let back: Formation = serde_json::from_str("\"4-2-3-1\"").unwrap();
        assert_eq!(back, Formation::FourTwoThreeOne);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_slots() -> impl Strategy<Value = Vec<Slot>> {
            prop::collection::vec((0.0f64..=100.0, 0.0f64..=100.0), 0..16).prop_map(|pts| {
                pts.into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| Slot {
                        index: i,
                        point: PitchPoint::new(x, y),
                        role: Role::Midfield,
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn prop_layout_counts_and_bounds(idx in 0usize..4) {
                let f = Formation::ALL[idx];
                let l = layout_for(f);
                let sizes = f.line_sizes();
                prop_assert_eq!(l.len(), 1 + sizes.iter().sum::<usize>());
                prop_assert_eq!(l.roles.iter().filter(|r| **r == Role::Defense).count(), sizes[0]);
                prop_assert_eq!(l.roles.iter().filter(|r| **r == Role::Midfield).count(), sizes[1]);
                prop_assert_eq!(
                    l.roles.iter().filter(|r| **r == Role::Attack).count(),
                    sizes[2..].iter().sum::<usize>()
                );
                for s in &l.slots {
                    prop_assert!((0.0..=100.0).contains(&s.point.x));
                    prop_assert!((0.0..=100.0).contains(&s.point.y));
                }
            }

            #[test]
            fn prop_mirror_twice_is_identity(slots in any_slots()) {
                let twice = mirror_vertical(&mirror_vertical(&slots));
                prop_assert_eq!(twice.len(), slots.len());
                for (a, b) in slots.iter().zip(&twice) {
                    prop_assert!((a.point.x - b.point.x).abs() < 1e-9);
                    prop_assert!((a.point.y - b.point.y).abs() < 1e-9);
                }
            }
        }
    }
}
