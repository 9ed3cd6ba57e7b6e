use std::fmt;

use crate::{
    game::{Phase, Team, battle::BattleState},
    view::roster::TeamDisplay,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Our answer is locked in and the other team is still thinking.
    WaitingForOpponent,
    Feedback { correct: bool },
}

/// Text rendering of whatever the current phase calls for.
pub struct Screen<'a> {
    state: &'a BattleState,
}

impl<'a> Screen<'a> {
    pub fn new(state: &'a BattleState) -> Self {
        Self { state }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        if self.state.feedback_visible() {
            return self
                .state
                .is_correct
                .map(|correct| Overlay::Feedback { correct });
        }
        if self.state.waiting_overlay_visible() {
            return Some(Overlay::WaitingForOpponent);
        }
        None
    }

    fn answer_text(&self, answer_id: &str) -> String {
        self.state
            .current_question
            .as_ref()
            .and_then(|q| q.answer(answer_id))
            .map(|a| a.text.clone())
            .unwrap_or_else(|| answer_id.to_string())
    }

    fn write_waiting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loading game...")?;
        let viewer_id = self.state.viewer.user_id;
        if let Some(team) = &self.state.player_team {
            write!(
                f,
                "{}",
                TeamDisplay::new(team, viewer_id)
                    .with_title("Your Team")
                    .current_team(true)
            )?;
        }
        if let Some(team) = &self.state.opposing_team {
            write!(
                f,
                "{}",
                TeamDisplay::new(team, viewer_id).with_title("Opponents")
            )?;
        }
        Ok(())
    }

    fn write_question(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        let Some(question) = &state.current_question else {
            return writeln!(f, "Loading question...");
        };

        writeln!(
            f,
            "Question {}/{}  [{} / {}]  {}s left",
            state.question_number,
            state.total_questions,
            question.category,
            question.difficulty,
            state.time_remaining
        )?;
        writeln!(f, "{}", question.text)?;

        for (i, answer) in question.answers.iter().enumerate() {
            let mut tags = Vec::new();
            if state.selected_answer.as_deref() == Some(answer.id.as_str()) {
                tags.push("selected".to_string());
            }
            if state.team_answer.as_deref() == Some(answer.id.as_str()) {
                tags.push("final".to_string());
            }
            let suggesters = state.suggestions.for_answer(&answer.id);
            if !suggesters.is_empty() {
                let names: Vec<&str> = suggesters.iter().map(|s| s.username.as_str()).collect();
                tags.push(format!("suggested by {}", names.join(", ")));
            }

            if tags.is_empty() {
                writeln!(f, "  [{}] {}", i + 1, answer.text)?;
            } else {
                writeln!(f, "  [{}] {}  ({})", i + 1, answer.text, tags.join("; "))?;
            }
        }

        if state.is_captain() && !state.has_submitted {
            writeln!(f, "You are the captain: select an answer, then finalize.")?;
        }
        Ok(())
    }

    fn write_results(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        // Dismissing feedback clears the id; the question still carries the reveal.
        let correct = state.correct_answer_id.as_deref().or_else(|| {
            state
                .current_question
                .as_ref()?
                .answers
                .iter()
                .find(|a| a.is_correct == Some(true))
                .map(|a| a.id.as_str())
        });
        match correct {
            Some(id) => writeln!(f, "Correct answer: {}", self.answer_text(id))?,
            None => writeln!(f, "Correct answer: not revealed")?,
        }
        match &state.team_answer {
            Some(id) => writeln!(f, "Your team answered: {}", self.answer_text(id))?,
            None => writeln!(f, "Your team did not answer")?,
        }
        for team in [&state.player_team, &state.opposing_team].into_iter().flatten() {
            writeln!(f, "  {}: {} pts", team.name, team.score)?;
        }
        Ok(())
    }

    fn write_team_tally(&self, f: &mut fmt::Formatter<'_>, team: &Team, ours: bool) -> fmt::Result {
        let state = self.state;
        let (mut score, correct, incorrect) = match (&state.your_team, ours) {
            (Some(tally), true) => (tally.score, tally.correct_answers, tally.incorrect_answers),
            _ => (team.score, team.correct_answers, team.incorrect_answers),
        };
        if let Some(final_score) = state.final_scores.as_ref().and_then(|s| s.score_for(&team.id)) {
            score = final_score;
        }
        writeln!(
            f,
            "  {}: {} pts, {} correct, {} incorrect",
            team.name, score, correct, incorrect
        )
    }

    fn write_finished(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        writeln!(f, "Battle over!")?;
        match &state.winner {
            Some(winner) => writeln!(f, "Winner: {}", winner.name)?,
            None => writeln!(f, "It's a tie")?,
        }
        if let Some(team) = &state.player_team {
            self.write_team_tally(f, team, true)?;
        }
        if let Some(team) = &state.opposing_team {
            self.write_team_tally(f, team, false)?;
        }
        writeln!(f, "[home] Back to home")
    }
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.phase {
            Phase::Waiting | Phase::Ready | Phase::Playing => self.write_waiting(f)?,
            Phase::Question => self.write_question(f)?,
            Phase::Results => self.write_results(f)?,
            Phase::Finished => self.write_finished(f)?,
        }

        match self.overlay() {
            Some(Overlay::WaitingForOpponent) => {
                writeln!(f, ">> Answer locked in. Waiting for the other team...")
            }
            Some(Overlay::Feedback { correct: true }) => {
                writeln!(f, ">> Correct! (enter to continue)")
            }
            Some(Overlay::Feedback { correct: false }) => {
                writeln!(f, ">> Wrong answer. (enter to continue)")
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        api::messages::ServerEvent,
        player::{MemberRole, TeamMember, Viewer},
    };

    use super::*;

    fn apply(state: &mut BattleState, value: serde_json::Value) {
        let event: ServerEvent = serde_json::from_value(value).expect("test event should parse");
        state.apply(event);
    }

    fn create_test_state() -> BattleState {
        let mut owls = Team::new("t1", "Owls", 7);
        owls.members = vec![
            TeamMember::new(7, "bob", MemberRole::Captain),
            TeamMember::new(8, "amy", MemberRole::Member),
        ];
        let mut foxes = Team::new("t2", "Foxes", 20);
        foxes.members = vec![TeamMember::new(20, "zed", MemberRole::Captain)];

        let mut state = BattleState::new(Viewer::new(7, "bob"));
        state.apply(ServerEvent::TeamsUpdated {
            teams: vec![owls, foxes],
        });
        state
    }

    fn start_question(state: &mut BattleState) {
        apply(
            state,
            json!({
                "type": "team_battle_question",
                "question": {
                    "id": "q1",
                    "text": "Largest planet?",
                    "answers": [{"id": "a1", "text": "Mars"}, {"id": "a2", "text": "Jupiter"}],
                    "category": "Space",
                    "difficulty": "easy"
                },
                "questionNumber": 2,
                "totalQuestions": 5,
                "timeLimit": 15
            }),
        );
    }

    #[test]
    fn test_waiting_screen_lists_rosters() {
        let state = create_test_state();
        let text = Screen::new(&state).to_string();

        assert!(text.starts_with("Loading game..."));
        assert!(text.contains("-- Your Team --"));
        assert!(text.contains("-- Opponents --"));
        assert_eq!(Screen::new(&state).overlay(), None);
    }

    #[test]
    fn test_question_screen() {
        let mut state = create_test_state();
        start_question(&mut state);
        state.select_answer("a2").expect("selection should be allowed");
        apply(
            &mut state,
            json!({"type": "team_option_selected", "teamId": "t1", "answerId": "a2", "userId": 8, "username": "amy"}),
        );

        let text = Screen::new(&state).to_string();

        assert!(text.contains("Question 2/5"));
        assert!(text.contains("15s left"));
        assert!(text.contains("[2] Jupiter  (selected; suggested by amy)"));
        assert!(text.contains("[1] Mars\n"));
        assert!(text.contains("You are the captain"));
    }

    #[test]
    fn test_waiting_for_opponent_overlay() {
        let mut state = create_test_state();
        start_question(&mut state);
        apply(
            &mut state,
            json!({"type": "team_answer_finalized", "finalAnswer": {"answerId": "a2"}}),
        );

        let screen = Screen::new(&state);
        assert_eq!(screen.overlay(), Some(Overlay::WaitingForOpponent));
        assert!(screen.to_string().contains("Waiting for the other team"));
    }

    #[test]
    fn test_results_and_feedback() {
        let mut state = create_test_state();
        start_question(&mut state);
        apply(
            &mut state,
            json!({"type": "team_answer_finalized", "finalAnswer": {"answerId": "a1"}}),
        );
        apply(
            &mut state,
            json!({
                "type": "team_battle_question_results",
                "correctAnswer": {"id": "a2"},
                "teamResults": [{"teamId": "t1", "correct": false}],
                "leaderboard": [{"teamId": "t1", "score": 0}, {"teamId": "t2", "score": 100}]
            }),
        );

        let text = Screen::new(&state).to_string();
        assert!(text.contains("Correct answer: Jupiter"));
        assert!(text.contains("Your team answered: Mars"));
        assert!(text.contains("Foxes: 100 pts"));
        assert_eq!(
            Screen::new(&state).overlay(),
            Some(Overlay::Feedback { correct: false })
        );

        state.dismiss_feedback();
        assert_eq!(Screen::new(&state).overlay(), None);
        assert!(
            Screen::new(&state)
                .to_string()
                .contains("Correct answer: Jupiter")
        );
    }

    #[test]
    fn test_results_without_correct_answer() {
        let mut state = create_test_state();
        start_question(&mut state);
        apply(
            &mut state,
            json!({
                "type": "team_battle_question_results",
                "teamResults": [{"teamId": "t1", "correct": false}]
            }),
        );

        let text = Screen::new(&state).to_string();
        assert!(text.contains("Correct answer: not revealed"));
        assert!(text.contains("Your team did not answer"));
    }

    #[test]
    fn test_finished_screen() {
        let mut state = create_test_state();
        apply(
            &mut state,
            json!({
                "type": "team_battle_finished",
                "finalScores": [{"teamId": "t1", "score": 300}, {"teamId": "t2", "score": 200}],
                "yourTeam": {"score": 300, "correctAnswers": 3, "incorrectAnswers": 2},
                "winner": {"name": "Owls"}
            }),
        );

        let text = Screen::new(&state).to_string();
        assert!(text.contains("Winner: Owls"));
        assert!(text.contains("Owls: 300 pts, 3 correct, 2 incorrect"));
        assert!(text.contains("Foxes: 200 pts, 0 correct, 0 incorrect"));
        assert!(text.contains("[home]"));
    }
}
