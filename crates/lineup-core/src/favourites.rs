// Favourite teams: a deduplicated, insertion-ordered list of team names.

/// The user's favourite teams, oldest first. Names are trimmed; blanks and
/// duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favourites {
    teams: Vec<String>,
}

impl Favourites {
    pub fn new<I, S>(teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut favourites = Favourites::default();
        for team in teams {
            let team = team.as_ref().trim();
            if !team.is_empty() && !favourites.contains(team) {
                favourites.teams.push(team.to_string());
            }
        }
        favourites
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn contains(&self, team: &str) -> bool {
        let team = team.trim();
        self.teams.iter().any(|t| t == team)
    }

    /// Add `team` if absent, remove it otherwise. Returns whether it is a
    /// favourite afterwards; blank names are never favourites.
    pub fn toggle(&mut self, team: &str) -> bool {
        let team = team.trim();
        if team.is_empty() {
            return false;
        }
        if self.contains(team) {
            self.teams.retain(|t| t != team);
            false
        } else {
            self.teams.push(team.to_string());
            true
        }
    }

    /// `teams` reordered so favourites come first. Both groups keep their
    /// order from `teams`; favourites that are not in `teams` are skipped.
    pub fn order_teams(&self, teams: &[String]) -> Vec<String> {
        let (mut first, rest): (Vec<String>, Vec<String>) =
            teams.iter().cloned().partition(|t| self.contains(t));
        first.extend(rest);
        first
    }
}
