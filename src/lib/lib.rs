//! Team Battle client
//!
//! A client for real-time, two-team trivia battles played over WebSockets.
//! The server owns every rule; this crate keeps a local projection of the
//! game, renders it and forwards the viewer's intents.
//!
//! # Game Flow
//!
//! 1. **Session**: The viewer's user and the session id from the page URL are checked
//! 2. **Snapshot**: The client connects and asks the server for the current game state
//! 3. **Rounds**: Teammates suggest answers, the captain finalizes one per question
//! 4. **Results**: The server reveals the correct answer and pushes updated scores
//!
//! # Modules
//!
//! - [`api`] - Wire messages and the page URL contract
//! - [`game`] - Game data and the local battle state
//! - [`net`] - Session setup and the WebSocket loop
//! - [`player`] - Team members and the viewer
//! - [`view`] - Text rendering of rosters and screens

pub mod api;
pub mod error;
pub mod game;
pub mod net;
pub mod player;
pub mod view;

use std::time::Duration;

pub use error::{IntentError, SessionError};
pub use game::{Phase, Team, battle::BattleState};
pub use player::*;

pub type UserId = u64;
pub type TeamId = String;
pub type QuestionId = String;
pub type AnswerId = String;

const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:3000/ws";

pub struct ClientConfig {
    pub server_url: String,
    pub page_url: Option<String>,
    pub user: Option<Viewer>,
    pub channel_capacity: usize,
    pub tick_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            page_url: None,
            user: None,
            channel_capacity: 20,
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Reads `TEAM_BATTLE_SERVER`, `TEAM_BATTLE_PAGE_URL`, `TEAM_BATTLE_USER_ID`
    /// and `TEAM_BATTLE_USERNAME`. Unset variables keep their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var("TEAM_BATTLE_SERVER") {
            Ok(url) => Self::new(url),
            Err(_) => Self::default(),
        };
        config.page_url = std::env::var("TEAM_BATTLE_PAGE_URL").ok();

        if let Ok(raw_id) = std::env::var("TEAM_BATTLE_USER_ID") {
            let user_id: UserId = raw_id.trim().parse()?;
            let username =
                std::env::var("TEAM_BATTLE_USERNAME").unwrap_or_else(|_| format!("player{user_id}"));
            config.user = Some(Viewer::new(user_id, username));
        }

        Ok(config)
    }

    pub fn with_user(mut self, user: Viewer) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = Some(page_url.into());
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}
