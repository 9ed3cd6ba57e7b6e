use std::{collections::BTreeMap, fmt};

use crate::{
    AnswerId, UserId,
    api::messages::{
        ClientCommand, FinalAnswer, FinalScores, GameSnapshot, LeaderboardEntry, ServerEvent,
        TeamResult, TeamTally, Winner,
    },
    error::IntentError,
    game::{Phase, Question, Team, suggestions::Suggestions},
    net::connection::{ConnectionStatus, SessionId},
    player::Viewer,
};

/// Used when neither the event nor the question carries a time limit.
pub const DEFAULT_TIME_LIMIT: u32 = 30;

/// Something worth telling the viewer that does not live in the state itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    RoundComplete { message: Option<String> },
    ServerError { message: String },
    Rejected(IntentError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundComplete { message: Some(m) } => write!(f, "Round complete: {m}"),
            Self::RoundComplete { message: None } => write!(f, "Round complete"),
            Self::ServerError { message } => write!(f, "Error: {message}"),
            Self::Rejected(e) => write!(f, "Not sent: {e}"),
        }
    }
}

/// The viewer's local copy of the battle, rebuilt from server events.
///
/// Nothing here is authoritative. Correctness and scores are only ever
/// copied from the server.
#[derive(Clone, Debug)]
pub struct BattleState {
    pub viewer: Viewer,
    pub phase: Phase,
    pub connection: ConnectionStatus,

    pub current_question: Option<Question>,
    pub question_number: u32,
    pub total_questions: u32,
    pub time_remaining: u32,

    pub teams: Vec<Team>,
    pub player_team: Option<Team>,
    pub opposing_team: Option<Team>,

    // per round
    pub selected_answer: Option<AnswerId>,
    pub has_submitted: bool,
    pub team_answer: Option<AnswerId>,
    pub member_answers: BTreeMap<UserId, AnswerId>,
    pub suggestions: Suggestions,
    pub correct_answer_id: Option<AnswerId>,
    pub is_correct: Option<bool>,
    pub show_feedback: bool,
    pub waiting_for_results: bool,

    pub final_scores: Option<FinalScores>,
    pub your_team: Option<TeamTally>,
    pub winner: Option<Winner>,
}

impl BattleState {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            phase: Phase::default(),
            connection: ConnectionStatus::default(),
            current_question: None,
            question_number: 0,
            total_questions: 0,
            time_remaining: 0,
            teams: Vec::new(),
            player_team: None,
            opposing_team: None,
            selected_answer: None,
            has_submitted: false,
            team_answer: None,
            member_answers: BTreeMap::new(),
            suggestions: Suggestions::default(),
            correct_answer_id: None,
            is_correct: None,
            show_feedback: false,
            waiting_for_results: false,
            final_scores: None,
            your_team: None,
            winner: None,
        }
    }

    pub fn apply(&mut self, event: ServerEvent) -> Option<Notice> {
        match event {
            ServerEvent::ConnectionEstablished { .. } => {
                self.connection = ConnectionStatus::Connected;
                None
            }

            ServerEvent::GameStateUpdate {
                game_state,
                player_team,
                opposing_team,
            } => {
                if let Some(snapshot) = game_state {
                    self.merge_snapshot(snapshot);
                }
                if player_team.is_some() {
                    self.player_team = player_team;
                }
                if opposing_team.is_some() {
                    self.opposing_team = opposing_team;
                }
                None
            }

            ServerEvent::TeamBattleStarted { .. } => {
                self.phase = Phase::Playing;
                None
            }

            ServerEvent::TeamBattleQuestion {
                question,
                question_number,
                total_questions,
                time_limit,
            } => {
                tracing::debug!(
                    question_id = %question.id,
                    question_number,
                    total_questions,
                    "New question"
                );
                self.time_remaining = time_limit
                    .or(question.time_limit)
                    .unwrap_or(DEFAULT_TIME_LIMIT);
                self.current_question = Some(question);
                self.question_number = question_number;
                self.total_questions = total_questions;
                self.phase = Phase::Question;
                self.reset_round();
                None
            }

            ServerEvent::TeamAnswerSubmitted {
                user_id,
                answer_id,
                team_id,
            } => {
                if self.from_other_team(team_id.as_deref()) {
                    tracing::debug!(?team_id, user_id, "Ignoring submission from another team");
                    return None;
                }
                if user_id != self.viewer.user_id {
                    self.member_answers.insert(user_id, answer_id);
                }
                None
            }

            ServerEvent::TeamOptionSelected {
                team_id,
                answer_id,
                user_id,
                username,
                ..
            } => {
                if self.from_other_team(team_id.as_deref()) {
                    tracing::debug!(?team_id, user_id, "Ignoring suggestion from another team");
                    return None;
                }
                self.suggestions.suggest(answer_id, user_id, username);
                None
            }

            ServerEvent::TeamAnswerFinalized {
                final_answer,
                team_id,
            } => {
                if self.from_other_team(team_id.as_deref()) {
                    tracing::debug!(?team_id, "Ignoring finalize from another team");
                    return None;
                }
                tracing::info!(answer_id = %final_answer.answer_id, "Team answer finalized");
                self.team_answer = Some(final_answer.answer_id);
                self.has_submitted = true;
                self.waiting_for_results = true;
                None
            }

            ServerEvent::TeamBattleQuestionResults {
                correct_answer,
                team_results,
                leaderboard,
            } => {
                self.reveal(correct_answer.map(|a| a.id), &team_results, &leaderboard);
                None
            }

            ServerEvent::TeamBattleRoundComplete { message } => {
                Some(Notice::RoundComplete { message })
            }

            ServerEvent::TeamBattleFinished {
                final_scores,
                your_team,
                winner,
            } => {
                tracing::info!(winner = ?winner.as_ref().map(|w| &w.name), "Battle finished");
                self.phase = Phase::Finished;
                self.waiting_for_results = false;
                self.final_scores = final_scores;
                self.your_team = your_team;
                self.winner = winner;
                None
            }

            ServerEvent::TeamsUpdated { teams } => {
                self.set_teams(teams);
                None
            }

            ServerEvent::Error { message } => {
                tracing::warn!(%message, "Server reported an error");
                Some(Notice::ServerError { message })
            }

            ServerEvent::Unknown => {
                tracing::debug!("Ignoring unknown event type");
                None
            }
        }
    }

    fn merge_snapshot(&mut self, snapshot: GameSnapshot) {
        let GameSnapshot {
            phase,
            current_question,
            question_number,
            total_questions,
            time_remaining,
            teams,
        } = snapshot;

        if let Some(phase) = phase {
            self.phase = phase;
        }
        if current_question.is_some() {
            self.current_question = current_question;
        }
        if let Some(n) = question_number {
            self.question_number = n;
        }
        if let Some(n) = total_questions {
            self.total_questions = n;
        }
        if let Some(t) = time_remaining {
            self.time_remaining = t;
        }
        if let Some(teams) = teams {
            self.set_teams(teams);
        }
    }

    fn reset_round(&mut self) {
        self.selected_answer = None;
        self.has_submitted = false;
        self.team_answer = None;
        self.member_answers.clear();
        self.suggestions.clear();
        self.correct_answer_id = None;
        self.is_correct = None;
        self.show_feedback = false;
        self.waiting_for_results = false;
    }

    /// True only when both the event's team and the player team are known
    /// and differ.
    fn from_other_team(&self, team_id: Option<&str>) -> bool {
        match (team_id, &self.player_team) {
            (Some(team_id), Some(team)) => team_id != team.id,
            _ => false,
        }
    }

    fn reveal(
        &mut self,
        correct_answer_id: Option<AnswerId>,
        team_results: &[TeamResult],
        leaderboard: &[LeaderboardEntry],
    ) {
        self.is_correct = self.player_team.as_ref().and_then(|team| {
            team_results
                .iter()
                .find(|r| r.team_id == team.id)
                .map(|r| r.correct)
        });

        if let (Some(question), Some(correct_id)) = (&mut self.current_question, &correct_answer_id) {
            for answer in &mut question.answers {
                answer.is_correct = Some(answer.id == *correct_id);
            }
        }

        for entry in leaderboard {
            let teams = self
                .teams
                .iter_mut()
                .chain(self.player_team.as_mut())
                .chain(self.opposing_team.as_mut());
            for team in teams.filter(|t| t.id == entry.team_id) {
                team.score = entry.score;
            }
        }

        tracing::debug!(
            correct_answer_id = ?correct_answer_id,
            is_correct = ?self.is_correct,
            "Question results"
        );

        self.correct_answer_id = correct_answer_id;
        self.show_feedback = true;
        self.waiting_for_results = false;
        self.phase = Phase::Results;
    }

    /// Replaces the roster and works out which team is ours.
    fn set_teams(&mut self, teams: Vec<Team>) {
        let viewer_id = self.viewer.user_id;
        let player_team = teams.iter().find(|t| t.has_member(viewer_id)).cloned();
        let opposing_team = player_team.as_ref().and_then(|ours| {
            teams.iter().find(|t| t.id != ours.id).cloned()
        });

        if player_team.is_none() {
            tracing::warn!(user_id = viewer_id, "Viewer is not on any team");
        }

        self.player_team = player_team;
        self.opposing_team = opposing_team;
        self.teams = teams;
    }
}

impl BattleState {
    pub fn snapshot_request(&self, session_id: &SessionId) -> ClientCommand {
        ClientCommand::GetGameState {
            game_session_id: session_id.clone(),
            user_id: self.viewer.user_id,
        }
    }

    pub fn is_captain(&self) -> bool {
        self.player_team
            .as_ref()
            .is_some_and(|t| t.is_captain(self.viewer.user_id))
    }

    fn active_question(&self) -> Result<&Question, IntentError> {
        match (&self.phase, &self.current_question) {
            (Phase::Question, Some(question)) => Ok(question),
            _ => Err(IntentError::NoActiveQuestion),
        }
    }

    /// Picks an answer locally and builds the advisory suggestion for teammates.
    pub fn select_answer(&mut self, answer_id: &str) -> Result<ClientCommand, IntentError> {
        let question = self.active_question()?;
        if self.has_submitted {
            return Err(IntentError::AlreadySubmitted);
        }
        if question.answer(answer_id).is_none() {
            return Err(IntentError::UnknownAnswer(answer_id.to_string()));
        }
        let team = self.player_team.as_ref().ok_or(IntentError::NoTeam)?;

        let cmd = ClientCommand::TeamOptionSelected {
            team_id: team.id.clone(),
            question_id: question.id.clone(),
            answer_id: answer_id.to_string(),
            user_id: self.viewer.user_id,
            username: self.viewer.username.clone(),
        };
        self.selected_answer = Some(answer_id.to_string());
        Ok(cmd)
    }

    /// Builds the captain's binding submission. The state only locks once the
    /// server confirms with `team_answer_finalized`.
    pub fn finalize_answer(&self) -> Result<ClientCommand, IntentError> {
        let question = self.active_question()?;
        let team = self.player_team.as_ref().ok_or(IntentError::NoTeam)?;
        if !team.is_captain(self.viewer.user_id) {
            return Err(IntentError::NotCaptain);
        }
        if self.has_submitted {
            return Err(IntentError::AlreadySubmitted);
        }
        let answer_id = self
            .selected_answer
            .clone()
            .ok_or(IntentError::NothingSelected)?;

        Ok(ClientCommand::FinalizeTeamAnswer {
            team_id: team.id.clone(),
            final_answer: FinalAnswer {
                question_id: Some(question.id.clone()),
                answer_id,
            },
        })
    }

    pub fn feedback_visible(&self) -> bool {
        self.correct_answer_id.is_some() && self.is_correct.is_some()
    }

    pub fn dismiss_feedback(&mut self) {
        self.correct_answer_id = None;
        self.is_correct = None;
        self.show_feedback = false;
    }

    pub fn waiting_overlay_visible(&self) -> bool {
        self.phase == Phase::Question && self.has_submitted && self.waiting_for_results
    }

    /// Counts the question timer down by one second. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Question || self.has_submitted || self.time_remaining == 0 {
            return false;
        }
        self.time_remaining -= 1;
        true
    }
}
