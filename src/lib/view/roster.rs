use std::fmt;

use crate::{UserId, game::Team};

pub const CROWN: &str = "👑";

/// A team's roster with an optional section title and "Ready" action.
pub struct TeamDisplay<'a> {
    team: &'a Team,
    viewer_id: UserId,
    title: Option<&'a str>,
    is_current_team: bool,
    on_ready: bool,
}

impl<'a> TeamDisplay<'a> {
    pub fn new(team: &'a Team, viewer_id: UserId) -> Self {
        Self {
            team,
            viewer_id,
            title: None,
            is_current_team: false,
            on_ready: false,
        }
    }

    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn current_team(mut self, is_current_team: bool) -> Self {
        self.is_current_team = is_current_team;
        self
    }

    pub fn with_ready_action(mut self) -> Self {
        self.on_ready = true;
        self
    }

    /// Only the captain, looking at their own team, gets the action.
    pub fn ready_visible(&self) -> bool {
        self.on_ready && self.is_current_team && self.team.is_captain(self.viewer_id)
    }
}

impl fmt::Display for TeamDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = self.title {
            writeln!(f, "-- {title} --")?;
        }
        writeln!(f, "{} ({} pts)", self.team.name, self.team.score)?;
        for member in &self.team.members {
            let marker = if member.is_captain() { CROWN } else { "  " };
            writeln!(f, "  {marker} {}", member.username)?;
        }
        if self.ready_visible() {
            writeln!(f, "  [ready] Ready")?;
        }
        Ok(())
    }
}
