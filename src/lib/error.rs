use thiserror::Error;

/// Reasons a battle session cannot start. Both send the viewer back home.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("no game session id in page url")]
    MissingSession,
    #[error("invalid page url: {0}")]
    InvalidUrl(String),
}

impl SessionError {
    pub fn redirect_to(&self) -> &'static str {
        "/"
    }
}

/// Local guards on outbound intents. The server still has the final say.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("no question is active")]
    NoActiveQuestion,
    #[error("the viewer is not on a team")]
    NoTeam,
    #[error("the team answer was already submitted")]
    AlreadySubmitted,
    #[error("no answer selected")]
    NothingSelected,
    #[error("only the captain can finalize the team answer")]
    NotCaptain,
    #[error("unknown answer {0}")]
    UnknownAnswer(String),
}
