use serde::{Deserialize, Serialize};

use crate::{AnswerId, QuestionId, TeamId, UserId, player::TeamMember};

pub mod battle;
pub mod suggestions;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: AnswerId,
    pub text: String,
    /// Withheld by the server until the round is resolved.
    #[serde(rename = "isCorrect", default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(rename = "timeLimit", default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

impl Question {
    pub fn answer(&self, answer_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

#[derive(Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TeamStatus {
    #[default]
    Forming,
    Ready,
    Playing,
    Finished,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(rename = "captainId")]
    pub captain_id: UserId,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub score: i64,
    #[serde(rename = "correctAnswers", default)]
    pub correct_answers: u32,
    #[serde(rename = "incorrectAnswers", default)]
    pub incorrect_answers: u32,
    #[serde(default)]
    pub status: TeamStatus,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, captain_id: UserId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            captain_id,
            members: Vec::new(),
            score: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            status: TeamStatus::default(),
        }
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn is_captain(&self, user_id: UserId) -> bool {
        self.captain_id == user_id
    }
}

/// Stage of the game as tracked locally.
#[derive(Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Waiting,
    Ready,
    Playing,
    Question,
    Results,
    Finished,
}
