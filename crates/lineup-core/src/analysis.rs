// Saved analyses: snapshots of one side's board, and their evaluation for
// the side-by-side compare view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::{AssignmentMap, TeamSide};
use crate::formation::{
    apply_free_positions, layout_for, rotate_horizontal, Formation, FreePositions, PitchPoint,
    Slot,
};
use crate::player::Player;
use crate::rating::{team_rating, RatingPolicy, TeamRating};

/// A tactical arrow drawn on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: PitchPoint,
    pub to: PitchPoint,
}

/// A persisted lineup. Every field is tolerant of absence since analyses are
/// read back from an external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    /// Formation id as stored; may be empty or unknown.
    #[serde(default)]
    pub formation: String,
    #[serde(default)]
    pub assigned: AssignmentMap,
    #[serde(default)]
    pub subs: Vec<Player>,
    #[serde(default)]
    pub free_positions: FreePositions,
    #[serde(default)]
    pub arrows: Vec<Arrow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedAnalysis {
    /// Snapshot the current state of a side.
    pub fn from_side(name: impl Into<String>, side: &TeamSide) -> Self {
        SavedAnalysis {
            id: None,
            name: name.into(),
            team: side.team().map(str::to_string),
            formation: side.formation().id().to_string(),
            assigned: side.assigned().clone(),
            subs: side.bench().to_vec(),
            free_positions: FreePositions::new(),
            arrows: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// The stored formation, falling back to the default when unknown.
    pub fn formation_or_default(&self) -> Formation {
        Formation::from_id(&self.formation).unwrap_or_default()
    }
}

/// Listing entry for saved analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
}

impl AnalysisSummary {
    /// Display label: "name - team", with a placeholder for unnamed entries.
    pub fn label(&self) -> String {
        let name = if self.name.trim().is_empty() {
            "(unnamed)"
        } else {
            self.name.as_str()
        };
        match &self.team {
            Some(team) if !team.is_empty() => format!("{} - {}", name, team),
            _ => name.to_string(),
        }
    }
}

impl SavedAnalysis {
    /// Listing entry; `None` for analyses that were never stored.
    pub fn summary(&self) -> Option<AnalysisSummary> {
        Some(AnalysisSummary {
            id: self.id?,
            name: self.name.clone(),
            team: self.team.clone(),
        })
    }
}

/// A saved analysis resolved against its team's roster.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub id: Option<i64>,
    pub name: String,
    pub team: Option<String>,
    pub formation: Formation,
    /// Slots on the horizontal pitch with free positions applied.
    pub points: Vec<Slot>,
    pub assigned: AssignmentMap,
    pub arrows: Vec<Arrow>,
    pub rating: TeamRating,
}

/// Lay out and rate a saved analysis for the compare view.
pub fn evaluate(analysis: &SavedAnalysis, roster: &[Player], policy: &RatingPolicy) -> AnalysisView {
    let formation = analysis.formation_or_default();
    let layout = layout_for(formation);
    let rotated = rotate_horizontal(&layout.slots);
    let points = apply_free_positions(&rotated, &analysis.free_positions);
    let rating = team_rating(&analysis.assigned, roster, &layout.roles, policy);

    AnalysisView {
        id: analysis.id,
        name: analysis.name.clone(),
        team: analysis.team.clone(),
        formation,
        points,
        assigned: analysis.assigned.clone(),
        arrows: analysis.arrows.clone(),
        rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Orientation;
    use crate::formation::FreePosition;

    fn roster() -> Vec<Player> {
        vec![
            Player::new("Raya", "Goalkeeper", 85.0),
            Player::new("Rice", "Midfielder", 86.0),
        ]
    }

    #[test]
    fn deserializes_camel_case_shape() {
        let json = r#"{
            "id": 7,
            "name": "High press",
            "team": "Arsenal",
            "formation": "4-3-3",
            "assigned": {"0": "Raya"},
            "subs": [],
            "freePositions": {"0": {"xPercent": 12.0}},
            "arrows": [{"from": {"xPercent": 10, "yPercent": 10}, "to": {"xPercent": 20, "yPercent": 30}}]
        }"#;
        let a: SavedAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, Some(7));
        assert_eq!(a.assigned.get(&0).map(String::as_str), Some("Raya"));
        assert_eq!(a.free_positions.get(&0).and_then(|f| f.x), Some(12.0));
        assert_eq!(a.arrows.len(), 1);
        assert!(a.created_at.is_none());
    }

    #[test]
    fn sparse_analysis_still_parses() {
        let a: SavedAnalysis = serde_json::from_str("{}").unwrap();
        assert!(a.assigned.is_empty());
        assert_eq!(a.formation_or_default(), Formation::FourThreeThree);
    }

    #[test]
    fn from_side_snapshots_assignment_and_bench() {
        let mut side = TeamSide::new(Orientation::Top, Formation::FourFourTwo, RatingPolicy::default());
        side.reset(Some("Arsenal".into()), roster());
        let gk = PitchPoint::new(50.0, 5.0);
        side.resolve_drop(gk, &roster()[0]);
        side.resolve_drop(gk, &roster()[1]);

        let a = SavedAnalysis::from_side("Test", &side);
        assert_eq!(a.team.as_deref(), Some("Arsenal"));
        assert_eq!(a.formation, "4-4-2");
        assert_eq!(a.assigned.get(&0).map(String::as_str), Some("Rice"));
        assert_eq!(a.subs, vec![roster()[0].clone()]);
        assert!(a.created_at.is_some());

        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("freePositions").is_some());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn evaluate_defaults_unknown_formation() {
        let a = SavedAnalysis {
            formation: "5-5-5".into(),
            ..serde_json::from_str("{}").unwrap()
        };
        let view = evaluate(&a, &roster(), &RatingPolicy::default());
        assert_eq!(view.formation, Formation::FourThreeThree);
        assert_eq!(view.points.len(), 11);
        assert_eq!(view.rating.average, 0.0);
    }

    #[test]
    fn evaluate_rotates_then_applies_free_positions() {
        let mut a: SavedAnalysis = serde_json::from_str("{}").unwrap();
        a.formation = "4-3-3".into();
        a.assigned.insert(0, "Raya".into());
        a.free_positions.insert(
            1,
            FreePosition {
                x: None,
                y: Some(42.0),
            },
        );
        let view = evaluate(&a, &roster(), &RatingPolicy::default());
        // Goalkeeper (50, 5) rotated to (5, 50)
        assert_eq!(view.points[0].point, PitchPoint::new(5.0, 50.0));
        // Slot 1 keeps its rotated x, takes the override y
        let base = rotate_horizontal(&layout_for(Formation::FourThreeThree).slots);
        assert_eq!(view.points[1].point.x, base[1].point.x);
        assert_eq!(view.points[1].point.y, 42.0);
        assert!((view.rating.average - 85.0).abs() < 1e-9);
    }

    #[test]
    fn summary_label() {
        let s = AnalysisSummary {
            id: 1,
            name: "".into(),
            team: Some("Arsenal".into()),
        };
        assert_eq!(s.label(), "(unnamed) - Arsenal");
        let s = AnalysisSummary {
            id: 2,
            name: "Low block".into(),
            team: None,
        };
        assert_eq!(s.label(), "Low block");
    }
}
