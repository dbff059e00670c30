//! Per-slide interaction registry
//!
//! Holds the latest [`InteractionResponse`] for each interaction id. Recording
//! a second response for the same id replaces the first; no history is kept.
//! Entries keep the order in which their id was first recorded so host output
//! is stable.

use crate::interaction::InteractionResponse;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Latest response per interaction id
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionRegistry {
    responses: IndexMap<String, InteractionResponse>,
}

/// Tally of graded responses in a registry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GradedTally {
    /// Responses with `is_correct` set
    pub answered: usize,
    /// Responses with `is_correct == Some(true)`
    pub correct: usize,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `response` under its interaction id, replacing any earlier one
    ///
    /// Never fails and performs no validation. Returns the replaced response.
    pub fn record_response(
        &mut self,
        response: InteractionResponse,
    ) -> Option<InteractionResponse> {
        let id = response.interaction_id.clone();
        let previous = self.responses.insert(id, response);
        if let Some(prev) = &previous {
            tracing::debug!(interaction = %prev.interaction_id, "response overwritten");
        }
        previous
    }

    pub fn get(&self, interaction_id: &str) -> Option<&InteractionResponse> {
        self.responses.get(interaction_id)
    }

    pub fn contains(&self, interaction_id: &str) -> bool {
        self.responses.contains_key(interaction_id)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Iterate `(interaction id, response)` pairs in first-recorded order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InteractionResponse)> {
        self.responses.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Owned copy for handing to a host
    pub fn snapshot(&self) -> InteractionRegistry {
        self.clone()
    }

    pub fn clear(&mut self) {
        self.responses.clear();
    }

    /// Count responses carrying a correctness flag, and the correct ones
    ///
    /// Only `is_correct` is consulted; the registry does not know the
    /// interaction kinds.
    pub fn tally(&self) -> GradedTally {
        self.responses
            .values()
            .filter_map(|r| r.is_correct)
            .fold(GradedTally::default(), |mut tally, correct| {
                tally.answered += 1;
                if correct {
                    tally.correct += 1;
                }
                tally
            })
    }
}

impl<'a> IntoIterator for &'a InteractionRegistry {
    type Item = (&'a String, &'a InteractionResponse);
    type IntoIter = indexmap::map::Iter<'a, String, InteractionResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
