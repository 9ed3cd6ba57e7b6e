use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnswerId, UserId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suggester {
    pub user_id: UserId,
    pub username: String,
}

/// Teammates currently pointing at each answer.
///
/// A member holds at most one suggestion: a new pick first removes the member
/// from every answer, then adds them to the chosen one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suggestions {
    by_answer: BTreeMap<AnswerId, Vec<Suggester>>,
}

impl Suggestions {
    pub fn suggest(&mut self, answer_id: AnswerId, user_id: UserId, username: String) {
        self.withdraw(user_id);
        self.by_answer
            .entry(answer_id)
            .or_default()
            .push(Suggester { user_id, username });
    }

    pub fn withdraw(&mut self, user_id: UserId) {
        for suggesters in self.by_answer.values_mut() {
            suggesters.retain(|s| s.user_id != user_id);
        }
        self.by_answer.retain(|_, suggesters| !suggesters.is_empty());
    }

    pub fn for_answer(&self, answer_id: &str) -> &[Suggester] {
        self.by_answer
            .get(answer_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnswerId, &Vec<Suggester>)> {
        self.by_answer.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.by_answer.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_answer.clear();
    }
}
