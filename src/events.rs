//! Refresh events: tell open pages that matches, standings or leagues changed.
//!
//! Events go through a tokio broadcast channel and are streamed to browsers as Server-Sent Events.

use crate::models::{DivisionId, LeagueId, MatchId, TeamId};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Events a slow subscriber may fall behind by before it skips ahead.
pub const EVENT_BUFFER: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefreshEvent {
    LeagueUpdated {
        league_id: LeagueId,
        revision: u64,
        at: DateTime<Utc>,
    },
    MatchUpdated {
        league_id: LeagueId,
        match_id: MatchId,
        revision: u64,
        at: DateTime<Utc>,
    },
    StandingsUpdated {
        league_id: LeagueId,
        division_id: DivisionId,
        team_ids: Vec<TeamId>,
        revision: u64,
        at: DateTime<Utc>,
    },
}

impl RefreshEvent {
    pub fn league(league_id: LeagueId, revision: u64) -> Self {
        RefreshEvent::LeagueUpdated {
            league_id,
            revision,
            at: Utc::now(),
        }
    }

    pub fn game(league_id: LeagueId, match_id: MatchId, revision: u64) -> Self {
        RefreshEvent::MatchUpdated {
            league_id,
            match_id,
            revision,
            at: Utc::now(),
        }
    }

    pub fn standings(
        league_id: LeagueId,
        division_id: DivisionId,
        team_ids: Vec<TeamId>,
        revision: u64,
    ) -> Self {
        RefreshEvent::StandingsUpdated {
            league_id,
            division_id,
            team_ids,
            revision,
            at: Utc::now(),
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            RefreshEvent::LeagueUpdated { .. } => "league_updated",
            RefreshEvent::MatchUpdated { .. } => "match_updated",
            RefreshEvent::StandingsUpdated { .. } => "standings_updated",
        }
    }

    /// One SSE frame: `event:` line, JSON `data:` line, blank line.
    pub fn to_sse(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("event: {}\ndata: {}\n\n", self.name(), data)
    }
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<RefreshEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUFFER)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send to every subscriber. Returns how many received it (0 when no page is listening).
    pub fn publish(&self, event: RefreshEvent) -> usize {
        log::debug!("Publishing {}", event.name());
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.sender.subscribe()
    }
}

/// Frame for a subscriber that fell behind and has to re-fetch everything.
pub fn resync_frame(skipped: u64) -> String {
    format!("event: resync\ndata: {{\"skipped\":{skipped}}}\n\n")
}

/// SSE frames for one subscriber, ending when the bus is dropped.
pub fn frames(rx: broadcast::Receiver<RefreshEvent>) -> impl Stream<Item = String> {
    stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => Some((event.to_sse(), rx)),
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Event stream lagged, skipped {} events", skipped);
                Some((resync_frame(skipped), rx))
            }
            Err(RecvError::Closed) => None,
        }
    })
}
