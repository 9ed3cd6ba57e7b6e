use crate::{
    api::handlers::parse_session_id, error::SessionError, net::connection::SessionId,
    player::Viewer,
};

/// Everything needed to join a battle once the prerequisites are met.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub viewer: Viewer,
}

/// Checks for an authenticated user and a session id in the page URL.
/// Either missing means the viewer is sent away before anything connects.
pub fn setup_session(
    user: Option<&Viewer>,
    page_url: Option<&str>,
) -> Result<SessionContext, SessionError> {
    let viewer = user.cloned().ok_or(SessionError::NotAuthenticated)?;

    let session_id = match page_url {
        Some(url) => parse_session_id(url)?,
        None => None,
    }
    .ok_or(SessionError::MissingSession)?;

    tracing::debug!(user_id = viewer.user_id, session_id = %session_id, "Session ready");
    Ok(SessionContext { session_id, viewer })
}
