use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    AnswerId, QuestionId, TeamId, UserId,
    game::{Phase, Question, Team},
    net::connection::SessionId,
};

/// Messages pushed by the battle server.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    ConnectionEstablished {
        #[serde(default)]
        message: Option<String>,
    },
    GameStateUpdate {
        #[serde(default)]
        game_state: Option<GameSnapshot>,
        #[serde(default)]
        player_team: Option<Team>,
        #[serde(default)]
        opposing_team: Option<Team>,
    },
    TeamBattleStarted {
        #[serde(default)]
        message: Option<String>,
    },
    TeamBattleQuestion {
        question: Question,
        question_number: u32,
        total_questions: u32,
        #[serde(default)]
        time_limit: Option<u32>,
    },
    TeamAnswerSubmitted {
        user_id: UserId,
        answer_id: AnswerId,
        #[serde(default)]
        team_id: Option<TeamId>,
    },
    TeamOptionSelected {
        #[serde(default)]
        team_id: Option<TeamId>,
        #[serde(default)]
        question_id: Option<QuestionId>,
        answer_id: AnswerId,
        user_id: UserId,
        username: String,
    },
    TeamAnswerFinalized {
        final_answer: FinalAnswer,
        #[serde(default)]
        team_id: Option<TeamId>,
    },
    TeamBattleQuestionResults {
        #[serde(default)]
        correct_answer: Option<CorrectAnswer>,
        #[serde(default)]
        team_results: Vec<TeamResult>,
        #[serde(default)]
        leaderboard: Vec<LeaderboardEntry>,
    },
    TeamBattleRoundComplete {
        #[serde(default)]
        message: Option<String>,
    },
    /// Older servers name this `team_battle_ended`; both end the game.
    #[serde(alias = "team_battle_ended")]
    TeamBattleFinished {
        #[serde(default)]
        final_scores: Option<FinalScores>,
        #[serde(default)]
        your_team: Option<TeamTally>,
        #[serde(default)]
        winner: Option<Winner>,
    },
    #[serde(alias = "team_update")]
    TeamsUpdated {
        #[serde(default)]
        teams: Vec<Team>,
    },
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::GameStateUpdate { .. } => "game_state_update",
            Self::TeamBattleStarted { .. } => "team_battle_started",
            Self::TeamBattleQuestion { .. } => "team_battle_question",
            Self::TeamAnswerSubmitted { .. } => "team_answer_submitted",
            Self::TeamOptionSelected { .. } => "team_option_selected",
            Self::TeamAnswerFinalized { .. } => "team_answer_finalized",
            Self::TeamBattleQuestionResults { .. } => "team_battle_question_results",
            Self::TeamBattleRoundComplete { .. } => "team_battle_round_complete",
            Self::TeamBattleFinished { .. } => "team_battle_finished",
            Self::TeamsUpdated { .. } => "teams_updated",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }
}

/// Messages sent by this client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    GetGameState {
        game_session_id: SessionId,
        user_id: UserId,
    },
    TeamOptionSelected {
        team_id: TeamId,
        question_id: QuestionId,
        answer_id: AnswerId,
        user_id: UserId,
        username: String,
    },
    FinalizeTeamAnswer {
        team_id: TeamId,
        final_answer: FinalAnswer,
    },
}

/// Partial game state; only the fields present are merged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub current_question: Option<Question>,
    #[serde(default)]
    pub question_number: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub time_remaining: Option<u32>,
    #[serde(default)]
    pub teams: Option<Vec<Team>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    pub answer_id: AnswerId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CorrectAnswer {
    pub id: AnswerId,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub team_id: TeamId,
    pub correct: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub team_id: TeamId,
    pub score: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeamTally {
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub incorrect_answers: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamScore {
    pub team_id: TeamId,
    pub score: i64,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub incorrect_answers: Option<u32>,
}

/// Servers send final scores either as a list or keyed by team id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum FinalScores {
    List(Vec<TeamScore>),
    ByTeam(BTreeMap<TeamId, i64>),
}

impl FinalScores {
    pub fn score_for(&self, team_id: &str) -> Option<i64> {
        match self {
            Self::List(scores) => scores.iter().find(|s| s.team_id == team_id).map(|s| s.score),
            Self::ByTeam(scores) => scores.get(team_id).copied(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Winner {
    #[serde(default)]
    pub id: Option<TeamId>,
    pub name: String,
}
