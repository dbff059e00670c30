//! Interaction descriptors and responses
//!
//! A slide declares its trackable interactions up front with an
//! [`InteractionDescriptor`] and reports what the learner did at runtime with
//! an [`InteractionResponse`].
//!
//! Responses are normally produced from the descriptor they belong to, which
//! pre-fills the id and concept metadata:
//!
//! ```rust
//! use lumen_core::interaction::{InteractionDescriptor, InteractionKind};
//!
//! let descriptor = InteractionDescriptor::new(
//!     "velocity-quiz-1",
//!     "kinematics.velocity",
//!     "Velocity",
//!     InteractionKind::Judging,
//!     "Identify the velocity of a body in free fall",
//! );
//!
//! let response = descriptor
//!     .respond("9.8 m/s")
//!     .correct(true)
//!     .at(1_700_000_000_000)
//!     .build();
//!
//! assert_eq!(response.interaction_id, "velocity-quiz-1");
//! assert_eq!(response.is_correct, Some(true));
//! ```

use serde::{Deserialize, Serialize};

/// Category of an interaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Exploratory, ungraded (dragging a control, switching a view)
    #[default]
    Learning,
    /// Graded against a known answer
    Judging,
}

impl InteractionKind {
    pub fn is_graded(&self) -> bool {
        matches!(self, InteractionKind::Judging)
    }
}

/// Static declaration of one trackable interaction on a slide
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDescriptor {
    /// Unique within the slide
    pub id: String,
    pub concept_id: String,
    pub concept_name: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub description: String,
}

impl InteractionDescriptor {
    pub fn new(
        id: impl Into<String>,
        concept_id: impl Into<String>,
        concept_name: impl Into<String>,
        kind: InteractionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            concept_id: concept_id.into(),
            concept_name: concept_name.into(),
            kind,
            description: description.into(),
        }
    }

    /// Start a response for this interaction
    ///
    /// The builder carries this descriptor's id and concept metadata, so the
    /// resulting response always refers back to the interaction that made it.
    pub fn respond(&self, value: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder {
            interaction_id: self.id.clone(),
            kind: self.kind,
            value: value.into(),
            is_correct: None,
            timestamp: None,
            concept_id: self.concept_id.clone(),
            concept_name: self.concept_name.clone(),
            concept_description: self.description.clone(),
            question: None,
        }
    }
}

/// Structured question metadata attached to graded responses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionMeta {
    /// Multiple-choice question with its options in display order
    Mcq {
        question: String,
        options: Vec<String>,
    },
}

/// One learner action as reported to the host
///
/// This is a plain value: nothing checks that `interaction_id` matches a
/// declared descriptor or that `is_correct` only appears on graded
/// interactions. Use [`InteractionDescriptor::respond`] to get those
/// guarantees by construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub interaction_id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub concept_id: String,
    pub concept_name: String,
    #[serde(default)]
    pub concept_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionMeta>,
}

/// Builder for a response bound to a descriptor
#[derive(Clone, Debug)]
#[must_use = "a response builder does nothing until built or completed"]
pub struct ResponseBuilder {
    interaction_id: String,
    kind: InteractionKind,
    value: String,
    is_correct: Option<bool>,
    timestamp: Option<i64>,
    concept_id: String,
    concept_name: String,
    concept_description: String,
    question: Option<QuestionMeta>,
}

impl ResponseBuilder {
    /// Mark the response as graded
    pub fn correct(mut self, is_correct: bool) -> Self {
        if !self.kind.is_graded() {
            tracing::debug!(
                interaction = %self.interaction_id,
                "correctness set on a learning interaction"
            );
        }
        self.is_correct = Some(is_correct);
        self
    }

    /// Attach multiple-choice question metadata
    pub fn mcq(mut self, question: impl Into<String>, options: Vec<String>) -> Self {
        self.question = Some(QuestionMeta::Mcq {
            question: question.into(),
            options,
        });
        self
    }

    /// Override the timestamp (milliseconds since epoch)
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The interaction id this builder is bound to
    pub fn interaction_id(&self) -> &str {
        &self.interaction_id
    }

    pub fn build(self) -> InteractionResponse {
        InteractionResponse {
            interaction_id: self.interaction_id,
            value: self.value,
            is_correct: self.is_correct,
            timestamp: self.timestamp.unwrap_or_else(now_millis),
            concept_id: self.concept_id,
            concept_name: self.concept_name,
            concept_description: self.concept_description,
            question: self.question,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
