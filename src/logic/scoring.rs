//! Score entry: padel set validation, match outcome, points, and recording a result.

use crate::error::LeagueError;
use crate::logic::access::is_league_manager;
use crate::logic::standings::recompute_division;
use crate::models::{
    DivisionId, LeagueId, LeagueStatus, MatchFormat, MatchId, MatchStatus, ProfileId, SetScore,
    Side, Store, TeamId,
};
use chrono::Utc;
use std::cmp::Ordering;

pub const WIN_POINTS: u32 = 3;
pub const LOSS_POINTS: u32 = 1;
/// Extra point for the winner of a 3-0 sweep.
pub const SWEEP_BONUS: u32 = 1;

/// Result of a validated list of sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchOutcome {
    pub team1_sets: u8,
    pub team2_sets: u8,
    pub winner: Side,
    pub is_sweep: bool,
}

impl MatchOutcome {
    pub fn from_sets(team1_sets: u8, team2_sets: u8) -> Option<Self> {
        let winner = match team1_sets.cmp(&team2_sets) {
            Ordering::Greater => Side::One,
            Ordering::Less => Side::Two,
            Ordering::Equal => return None,
        };
        Some(Self {
            team1_sets,
            team2_sets,
            winner,
            is_sweep: team1_sets.max(team2_sets) == 3 && team1_sets.min(team2_sets) == 0,
        })
    }
}

/// Which side won a set (numbered from 1 for messages).
///
/// A set is over at 6 games against at most 4, or at 7 against 5 or 6 (7-6 being a tie-break).
pub fn validate_set(set_no: usize, score: SetScore) -> Result<Side, LeagueError> {
    let invalid = |reason| LeagueError::InvalidSetScore {
        set: set_no,
        score,
        reason,
    };
    let (winner, loser, side) = match score.team1.cmp(&score.team2) {
        Ordering::Greater => (score.team1, score.team2, Side::One),
        Ordering::Less => (score.team2, score.team1, Side::Two),
        Ordering::Equal => return Err(invalid("a set cannot end level; enter a tie-break as 7-6")),
    };
    match (winner, loser) {
        (6, 0..=4) | (7, 5 | 6) => Ok(side),
        (0..=5, _) => Err(invalid("the winner needs at least 6 games")),
        (6, _) => Err(invalid("at 6-5 the set continues to 7-5 or a 7-6 tie-break")),
        (7, _) => Err(invalid("7 games only win a set against 5 or 6")),
        _ => Err(invalid("a set never goes beyond 7 games")),
    }
}

/// Validate the sets of a match in order and find its winner.
pub fn evaluate_match(format: MatchFormat, sets: &[SetScore]) -> Result<MatchOutcome, LeagueError> {
    let needed = format.sets_to_win();
    let (mut team1, mut team2) = (0u8, 0u8);
    for (i, set) in sets.iter().enumerate() {
        if team1 == needed || team2 == needed {
            return Err(LeagueError::ExtraSets { decided_after: i });
        }
        match validate_set(i + 1, *set)? {
            Side::One => team1 += 1,
            Side::Two => team2 += 1,
        }
    }
    if team1 != needed && team2 != needed {
        return Err(LeagueError::UndecidedMatch { needed });
    }
    MatchOutcome::from_sets(team1, team2).ok_or(LeagueError::UndecidedMatch { needed })
}

/// (points, bonus points) earned by `side`.
pub fn points_for(outcome: &MatchOutcome, side: Side) -> (u32, u32) {
    if outcome.winner == side {
        (WIN_POINTS, if outcome.is_sweep { SWEEP_BONUS } else { 0 })
    } else {
        (LOSS_POINTS, 0)
    }
}

/// What changed when a score was recorded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedScore {
    pub league_id: LeagueId,
    pub division_id: DivisionId,
    pub match_id: MatchId,
    pub outcome: MatchOutcome,
    /// Teams whose standings were recomputed.
    pub team_ids: Vec<TeamId>,
}

/// Record (or correct) the result of a match and recompute its division's standings.
///
/// League managers may record any non-cancelled match; players of either team only a confirmed
/// one. The league must be active. Match and standings change together or not at all.
pub fn record_score(
    store: &mut Store,
    actor: ProfileId,
    match_id: MatchId,
    sets: &[SetScore],
) -> Result<RecordedScore, LeagueError> {
    let game = store.game(match_id)?.clone();
    let league = store.league(game.league_id)?.clone();
    let profile = store.profile(actor)?;

    let manager = is_league_manager(profile, &league);
    if !manager {
        let plays = store.team(game.team1_id)?.has_player(actor)
            || store.team(game.team2_id)?.has_player(actor);
        if !plays {
            return Err(LeagueError::NotOnTeam);
        }
        if game.status != MatchStatus::Confirmed {
            return Err(LeagueError::InvalidMatchState(game.status));
        }
    }
    if league.status != LeagueStatus::Active {
        return Err(LeagueError::WrongLeagueStatus {
            status: league.status,
            required: "active",
        });
    }
    if game.status == MatchStatus::Cancelled {
        return Err(LeagueError::InvalidMatchState(game.status));
    }
    let outcome = evaluate_match(league.match_format, sets)?;

    let stored = store.game_mut(match_id)?;
    stored.sets = sets.to_vec();
    stored.team1_score = Some(outcome.team1_sets);
    stored.team2_score = Some(outcome.team2_sets);
    stored.winner_team_id = Some(stored.team(outcome.winner));
    stored.status = MatchStatus::Completed;
    stored.updated_at = Utc::now();

    let team_ids = recompute_division(store, game.division_id)?;
    log::info!(
        "Match {} recorded {}-{} in league '{}'",
        match_id,
        outcome.team1_sets,
        outcome.team2_sets,
        league.name
    );
    Ok(RecordedScore {
        league_id: game.league_id,
        division_id: game.division_id,
        match_id,
        outcome,
        team_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(a: u8, b: u8) -> SetScore {
        SetScore::new(a, b)
    }

    #[test]
    fn accepts_regular_and_tiebreak_sets() {
        for (a, b) in [(6, 0), (6, 4), (7, 5), (7, 6), (4, 6), (6, 7)] {
            assert!(validate_set(1, s(a, b)).is_ok(), "{a}-{b} should be valid");
        }
        assert_eq!(validate_set(1, s(7, 6)).unwrap(), Side::One);
        assert_eq!(validate_set(1, s(3, 6)).unwrap(), Side::Two);
    }

    #[test]
    fn rejects_8_6_with_message() {
        let err = validate_set(2, s(8, 6)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Set 2 (8-6) is not a valid score: a set never goes beyond 7 games"
        );
    }

    #[test]
    fn rejects_6_6_with_message() {
        let err = validate_set(1, s(6, 6)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Set 1 (6-6) is not a valid score: a set cannot end level; enter a tie-break as 7-6"
        );
    }

    #[test]
    fn rejects_unfinished_and_impossible_sets() {
        for (a, b) in [(6, 5), (5, 3), (7, 4), (7, 0), (0, 0), (9, 7)] {
            assert!(
                matches!(validate_set(1, s(a, b)), Err(LeagueError::InvalidSetScore { .. })),
                "{a}-{b} should be invalid"
            );
        }
    }

    #[test]
    fn best_of_three_is_decided_at_two_sets() {
        let straight = evaluate_match(MatchFormat::BestOfThree, &[s(6, 3), s(6, 4)]).unwrap();
        assert_eq!((straight.team1_sets, straight.team2_sets), (2, 0));
        assert_eq!(straight.winner, Side::One);
        assert!(!straight.is_sweep);

        let decider =
            evaluate_match(MatchFormat::BestOfThree, &[s(6, 3), s(4, 6), s(5, 7)]).unwrap();
        assert_eq!(decider.winner, Side::Two);
        assert_eq!((decider.team1_sets, decider.team2_sets), (1, 2));
    }

    #[test]
    fn sets_after_the_decider_are_rejected() {
        assert_eq!(
            evaluate_match(MatchFormat::BestOfThree, &[s(6, 3), s(6, 4), s(6, 0)]),
            Err(LeagueError::ExtraSets { decided_after: 2 })
        );
    }

    #[test]
    fn undecided_matches_are_rejected() {
        assert_eq!(
            evaluate_match(MatchFormat::BestOfThree, &[s(6, 3), s(4, 6)]),
            Err(LeagueError::UndecidedMatch { needed: 2 })
        );
        assert_eq!(
            evaluate_match(MatchFormat::BestOfFive, &[]),
            Err(LeagueError::UndecidedMatch { needed: 3 })
        );
    }

    #[test]
    fn three_nil_earns_the_bonus() {
        let sweep = evaluate_match(MatchFormat::BestOfFive, &[s(6, 1), s(6, 2), s(7, 5)]).unwrap();
        assert!(sweep.is_sweep);
        assert_eq!(points_for(&sweep, Side::One), (WIN_POINTS, SWEEP_BONUS));
        assert_eq!(points_for(&sweep, Side::Two), (LOSS_POINTS, 0));

        let close =
            evaluate_match(MatchFormat::BestOfFive, &[s(6, 1), s(3, 6), s(6, 2), s(7, 5)])
                .unwrap();
        assert!(!close.is_sweep);
        assert_eq!(points_for(&close, Side::One), (WIN_POINTS, 0));
    }
}
