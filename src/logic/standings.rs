//! Standings: registration stats rebuilt from completed matches, ordering and CSV export.

use crate::error::LeagueError;
use crate::logic::scoring::{points_for, MatchOutcome};
use crate::models::{
    Division, DivisionId, League, LeagueId, LeagueRegistration, MatchStatus, Side, Store, TeamId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One line of a division table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub team_id: TeamId,
    pub team_name: String,
    pub points: u32,
    pub bonus_points: u32,
    pub total_points: u32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub win_percentage: f64,
}

impl StandingRow {
    pub fn from_registration(
        registration: &LeagueRegistration,
        team_name: impl Into<String>,
    ) -> Self {
        Self {
            rank: 0,
            team_id: registration.team_id,
            team_name: team_name.into(),
            points: registration.points,
            bonus_points: registration.bonus_points,
            total_points: registration.total_points(),
            matches_played: registration.matches_played,
            matches_won: registration.matches_won,
            matches_lost: registration.matches_played.saturating_sub(registration.matches_won),
            win_percentage: registration.win_percentage(),
        }
    }

    /// Win rate as an exact fraction; 0/1 when nothing was played.
    fn win_rate(&self) -> (u64, u64) {
        if self.matches_played == 0 {
            (0, 1)
        } else {
            (u64::from(self.matches_won), u64::from(self.matches_played))
        }
    }
}

/// Table order: total points, then win percentage, then matches won (all descending), then name.
pub fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    let (a_won, a_played) = a.win_rate();
    let (b_won, b_played) = b.win_rate();
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| (b_won * a_played).cmp(&(a_won * b_played)))
        .then_with(|| b.matches_won.cmp(&a.matches_won))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Sort rows into table order and number them from 1.
pub fn sort_standings(rows: &mut [StandingRow]) {
    rows.sort_by(compare_rows);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
}

/// Rebuild points, bonus, played and won for every approved registration of a division from its
/// completed matches. Running it twice gives the same numbers, so a corrected score only needs
/// another run. Returns the teams of the division.
pub fn recompute_division(
    store: &mut Store,
    division_id: DivisionId,
) -> Result<Vec<TeamId>, LeagueError> {
    let mut totals: HashMap<TeamId, (u32, u32, u32, u32)> = store
        .registrations
        .iter()
        .filter(|r| r.division_id == division_id && r.is_approved())
        .map(|r| (r.team_id, (0, 0, 0, 0)))
        .collect();

    for game in store
        .matches
        .iter()
        .filter(|m| m.division_id == division_id && m.status == MatchStatus::Completed)
    {
        let outcome = match (game.team1_score, game.team2_score) {
            (Some(t1), Some(t2)) => match MatchOutcome::from_sets(t1, t2) {
                Some(outcome) => outcome,
                None => continue,
            },
            _ => continue,
        };
        for side in [Side::One, Side::Two] {
            if let Some(entry) = totals.get_mut(&game.team(side)) {
                let (points, bonus) = points_for(&outcome, side);
                entry.0 += points;
                entry.1 += bonus;
                entry.2 += 1;
                entry.3 += u32::from(outcome.winner == side);
            }
        }
    }

    let mut teams = Vec::with_capacity(totals.len());
    for registration in store
        .registrations
        .iter_mut()
        .filter(|r| r.division_id == division_id && r.is_approved())
    {
        let (points, bonus, played, won) =
            totals.get(&registration.team_id).copied().unwrap_or_default();
        registration.points = points;
        registration.bonus_points = bonus;
        registration.matches_played = played;
        registration.matches_won = won;
        teams.push(registration.team_id);
    }
    log::info!("Standings recomputed for division {} ({} teams)", division_id, teams.len());
    Ok(teams)
}

/// Sorted table of one division (approved teams only).
pub fn division_standings(store: &Store, division_id: DivisionId) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = store
        .registrations
        .iter()
        .filter(|r| r.division_id == division_id && r.is_approved())
        .map(|r| StandingRow::from_registration(r, store.team_name(r.team_id)))
        .collect();
    sort_standings(&mut rows);
    rows
}

#[derive(Clone, Debug, Serialize)]
pub struct DivisionStandings {
    pub division: Division,
    pub rows: Vec<StandingRow>,
}

/// Current standings of every division of a league, top division first.
#[derive(Clone, Debug, Serialize)]
pub struct Leaderboard {
    pub league: League,
    pub divisions: Vec<DivisionStandings>,
    pub revision: u64,
    pub generated_at: DateTime<Utc>,
}

pub fn leaderboard(store: &Store, league_id: LeagueId) -> Result<Leaderboard, LeagueError> {
    let league = store.league(league_id)?.clone();
    let mut divisions: Vec<&Division> =
        store.divisions.iter().filter(|d| d.league_id == league_id).collect();
    divisions.sort_by_key(|d| d.level);
    Ok(Leaderboard {
        league,
        divisions: divisions
            .into_iter()
            .map(|d| DivisionStandings {
                division: d.clone(),
                rows: division_standings(store, d.id),
            })
            .collect(),
        revision: store.revision,
        generated_at: Utc::now(),
    })
}

#[derive(Serialize)]
struct CsvRow<'a> {
    division: &'a str,
    rank: usize,
    team: &'a str,
    played: u32,
    won: u32,
    lost: u32,
    points: u32,
    bonus: u32,
    total: u32,
    win_percentage: String,
}

/// The leaderboard as CSV, one line per team.
pub fn standings_csv(board: &Leaderboard) -> Result<String, LeagueError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for division in &board.divisions {
        for row in &division.rows {
            wtr.serialize(CsvRow {
                division: &division.division.name,
                rank: row.rank,
                team: &row.team_name,
                played: row.matches_played,
                won: row.matches_won,
                lost: row.matches_lost,
                points: row.points,
                bonus: row.bonus_points,
                total: row.total_points,
                win_percentage: format!("{:.1}", row.win_percentage),
            })
            .map_err(|e| LeagueError::Export(e.to_string()))?;
        }
    }
    let bytes = wtr.into_inner().map_err(|e| LeagueError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LeagueError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(name: &str, total: u32, played: u32, won: u32) -> StandingRow {
        StandingRow {
            rank: 0,
            team_id: Uuid::new_v4(),
            team_name: name.to_string(),
            points: total,
            bonus_points: 0,
            total_points: total,
            matches_played: played,
            matches_won: won,
            matches_lost: played - won,
            win_percentage: 0.0,
        }
    }

    #[test]
    fn sorts_by_points_then_win_rate_then_wins() {
        let mut rows = vec![
            row("Delta", 9, 3, 3),   // 9 pts, 100%
            row("Alpha", 10, 4, 2),  // 10 pts
            row("Echo", 9, 5, 2),    // 9 pts, 40%, 2 wins
            row("Charlie", 9, 6, 3), // 9 pts, 50%, 3 wins
            row("Bravo", 9, 4, 2),   // 9 pts, 50%, 2 wins
        ];
        sort_standings(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(order, ["Alpha", "Delta", "Charlie", "Bravo", "Echo"]);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn unplayed_teams_rank_by_name_after_equal_points() {
        let mut rows = vec![row("Zulu", 0, 0, 0), row("Mike", 0, 0, 0)];
        sort_standings(&mut rows);
        assert_eq!(rows[0].team_name, "Mike");
    }

    #[test]
    fn win_rate_compares_exactly() {
        // 2/3 vs 4/6 are equal rates, so wins decide.
        let a = row("A", 6, 3, 2);
        let b = row("B", 6, 6, 4);
        assert_eq!(compare_rows(&a, &b), Ordering::Greater);
    }
}
