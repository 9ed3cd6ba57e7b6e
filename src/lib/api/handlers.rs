use axum::extract::Query;
use http::Uri;
use serde::Deserialize;

use crate::{error::SessionError, net::connection::SessionId};

/// Query parameters of the battle page, e.g. `/team-battle?session=abc`.
#[derive(Deserialize, Debug, Default)]
pub struct SessionQuery {
    pub session: Option<String>,
    #[serde(rename = "gameSessionId")]
    pub game_session_id: Option<String>,
}

impl SessionQuery {
    /// `session` wins over `gameSessionId`; blank values count as absent.
    pub fn session_id(self) -> Option<SessionId> {
        [self.session, self.game_session_id]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .map(SessionId::from)
    }
}

pub fn parse_session_id(page_url: &str) -> Result<Option<SessionId>, SessionError> {
    let uri: Uri = page_url
        .parse()
        .map_err(|e: http::uri::InvalidUri| SessionError::InvalidUrl(e.to_string()))?;
    if uri.query().is_none() {
        return Ok(None);
    }
    let Query(query) = Query::<SessionQuery>::try_from_uri(&uri)
        .map_err(|e| SessionError::InvalidUrl(e.body_text()))?;
    Ok(query.session_id())
}
