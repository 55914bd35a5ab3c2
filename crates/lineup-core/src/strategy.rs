// Recommended formation and playing style per club.

use crate::formation::Formation;

/// A tactical recommendation for one team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyPreset {
    pub formation: Formation,
    pub style: &'static str,
    pub keys: [&'static str; 3],
}

static PRESETS: &[(&str, StrategyPreset)] = &[
    (
        "arsenal",
        StrategyPreset {
            formation: Formation::FourThreeThree,
            style: "Positional play, controlled build-up, aggressive counter-press",
            keys: [
                "Overloads in half-spaces",
                "High line + compact rest defense",
                "Quick switches to isolate wingers",
            ],
        },
    ),
    (
        "barcelona",
        StrategyPreset {
            formation: Formation::FourThreeThree,
            style: "Patient build-up, third-man runs, dominate possession",
            keys: [
                "Play through midfield triangles",
                "Use fullbacks for width",
                "Press immediately after loss",
            ],
        },
    ),
    (
        "bayernmunich",
        StrategyPreset {
            formation: Formation::FourTwoThreeOne,
            style: "High press, fast wing progression, relentless chance creation",
            keys: [
                "Win ball high",
                "Attack wide then cut-backs",
                "Vertical passes into the 10",
            ],
        },
    ),
    (
        "juventus",
        StrategyPreset {
            formation: Formation::ThreeFiveTwo,
            style: "Compact mid-block, controlled transitions, strong central presence",
            keys: [
                "Protect central zones",
                "Progress via wing-backs",
                "Direct play to split strikers",
            ],
        },
    ),
    (
        "liverpool",
        StrategyPreset {
            formation: Formation::FourThreeThree,
            style: "Intense pressing, rapid transitions, wide overloads",
            keys: [
                "Counter-pressing triggers",
                "Early crosses and cut-backs",
                "Run beyond the back line",
            ],
        },
    ),
    (
        "manchesterunited",
        StrategyPreset {
            formation: Formation::FourTwoThreeOne,
            style: "Transition-focused, quick vertical attacks, exploit space behind",
            keys: [
                "Fast breaks after regain",
                "Isolate winger 1v1",
                "Protect build-up with double pivot",
            ],
        },
    ),
    (
        "psg",
        StrategyPreset {
            formation: Formation::FourThreeThree,
            style: "Control with talent, isolate star attackers, attack the box quickly",
            keys: [
                "Create 1v1s in wide areas",
                "Underlaps from midfield",
                "Fast combinations near the box",
            ],
        },
    ),
    (
        "realmadrid",
        StrategyPreset {
            formation: Formation::FourThreeThree,
            style: "Flexible structure, big-game transitions, patient probing",
            keys: [
                "Switch tempo on cue",
                "Exploit half-space runs",
                "Protect counters with smart rest defense",
            ],
        },
    ),
];

/// Used for any club without a dedicated preset.
pub const FALLBACK_PRESET: StrategyPreset = StrategyPreset {
    formation: Formation::FourThreeThree,
    style: "Balanced build-up, disciplined defending, quick transitions",
    keys: [
        "Keep compact shape",
        "Progress via wide channels",
        "Create 2v1s near the touchline",
    ],
};

/// Lowercase alphanumerics only: "Bayern Munich" -> "bayernmunich".
pub fn team_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn strategy_for_team(name: &str) -> StrategyPreset {
    let key = team_key(name);
    PRESETS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, preset)| *preset)
        .unwrap_or(FALLBACK_PRESET)
}
