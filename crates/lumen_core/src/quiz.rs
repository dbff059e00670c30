//! Reusable multiple-choice quiz flow
//!
//! Every graded slide runs the same machine, parameterized by a
//! [`QuizConfig`]:
//!
//! ```text
//! Unanswered(0) --select--> Unanswered(0) --submit--> Answered(0) --next--> Unanswered(1)
//!      ...                                            Answered(n-1) --next--> Complete
//! ```
//!
//! The score is committed inside `submit`. `Complete` only reads the
//! committed total.
//!
//! # Example
//!
//! ```rust
//! use lumen_core::quiz::{McqQuestion, QuizConfig, QuizMachine};
//!
//! let config = QuizConfig::new(vec![McqQuestion::new(
//!     "Which organelle produces ATP?",
//!     ["Nucleus", "Mitochondrion", "Ribosome", "Golgi body"],
//!     1,
//! )]);
//!
//! let mut quiz = QuizMachine::new(config).unwrap();
//! quiz.select(1).unwrap();
//! quiz.submit().unwrap();
//! quiz.next().unwrap();
//!
//! assert!(quiz.is_complete());
//! assert_eq!(quiz.score(), 1);
//! ```

use crate::interaction::{InteractionDescriptor, InteractionResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from quiz configuration and transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} needs at least two options, found {found}")]
    TooFewOptions { index: usize, found: usize },

    #[error("question {index} marks option {correct} correct but has {options} options")]
    CorrectIndexOutOfRange {
        index: usize,
        correct: usize,
        options: usize,
    },

    #[error("option {option} is out of range ({options} options)")]
    OptionOutOfRange { option: usize, options: usize },

    #[error("no option selected")]
    NothingSelected,

    #[error("question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("question {0} has not been answered yet")]
    NotAnswered(usize),

    #[error("quiz is complete")]
    QuizComplete,

    #[error("total points exceed {}", u32::MAX)]
    ScoreOverflow,
}

/// Result type for quiz operations
pub type Result<T> = std::result::Result<T, QuizError>;

fn default_points() -> u32 {
    1
}

/// A multiple-choice question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    /// Weight under [`ScoringPolicy::Weighted`]
    #[serde(default = "default_points")]
    pub points: u32,
    /// Optional explanation shown with feedback
    #[serde(default)]
    pub explanation: Option<String>,
    /// Interaction reported to the slide when this question is submitted
    #[serde(default)]
    pub interaction: Option<InteractionDescriptor>,
}

impl McqQuestion {
    pub fn new<I, S>(prompt: impl Into<String>, options: I, correct_index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_index,
            points: default_points(),
            explanation: None,
            interaction: None,
        }
    }

    pub fn points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Report submissions of this question through `descriptor`
    pub fn tracked_by(mut self, descriptor: InteractionDescriptor) -> Self {
        self.interaction = Some(descriptor);
        self
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// How correct answers contribute to the score
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// One point per correct answer
    #[default]
    PerCorrect,
    /// Each correct answer adds its question's `points`
    Weighted,
}

impl ScoringPolicy {
    fn points_for(&self, question: &McqQuestion) -> u32 {
        match self {
            ScoringPolicy::PerCorrect => 1,
            ScoringPolicy::Weighted => question.points,
        }
    }
}

/// Questions plus scoring policy
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    pub questions: Vec<McqQuestion>,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl QuizConfig {
    pub fn new(questions: Vec<McqQuestion>) -> Self {
        Self {
            questions,
            scoring: ScoringPolicy::default(),
        }
    }

    pub fn scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    /// Check that every question is answerable
    pub fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.options.len() < 2 {
                return Err(QuizError::TooFewOptions {
                    index,
                    found: question.options.len(),
                });
            }
            if question.correct_index >= question.options.len() {
                return Err(QuizError::CorrectIndexOutOfRange {
                    index,
                    correct: question.correct_index,
                    options: question.options.len(),
                });
            }
        }
        self.checked_max_score().ok_or(QuizError::ScoreOverflow)?;
        Ok(())
    }

    /// Highest reachable score under this config's policy
    ///
    /// Saturates at `u32::MAX`; [`validate`](Self::validate) rejects such
    /// configs.
    pub fn max_score(&self) -> u32 {
        self.checked_max_score().unwrap_or(u32::MAX)
    }

    fn checked_max_score(&self) -> Option<u32> {
        self.questions
            .iter()
            .try_fold(0u32, |total, q| total.checked_add(self.scoring.points_for(q)))
    }
}

/// Where the quiz currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuizPhase {
    /// Question `index` is showing; `selected` is tentative
    Unanswered {
        index: usize,
        selected: Option<usize>,
    },
    /// Question `index` was submitted and feedback is visible
    Answered {
        index: usize,
        selected: usize,
        correct: bool,
    },
    /// All questions answered
    Complete,
}

/// Input to the quiz machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuizEvent {
    Select(usize),
    Submit,
    Next,
    Reset,
}

impl QuizPhase {
    pub const INITIAL: QuizPhase = QuizPhase::Unanswered {
        index: 0,
        selected: None,
    };

    /// Pure transition table
    ///
    /// `correct_index` is the current question's correct option and
    /// `question_count` the length of the quiz. Returns `None` when `event`
    /// does not apply in this phase.
    pub fn on_event(
        &self,
        event: QuizEvent,
        correct_index: usize,
        question_count: usize,
    ) -> Option<QuizPhase> {
        match (*self, event) {
            (_, QuizEvent::Reset) => Some(QuizPhase::INITIAL),
            (QuizPhase::Unanswered { index, .. }, QuizEvent::Select(option)) => {
                Some(QuizPhase::Unanswered {
                    index,
                    selected: Some(option),
                })
            }
            (
                QuizPhase::Unanswered {
                    index,
                    selected: Some(selected),
                },
                QuizEvent::Submit,
            ) => Some(QuizPhase::Answered {
                index,
                selected,
                correct: selected == correct_index,
            }),
            (QuizPhase::Answered { index, .. }, QuizEvent::Next) => {
                if index + 1 < question_count {
                    Some(QuizPhase::Unanswered {
                        index: index + 1,
                        selected: None,
                    })
                } else {
                    Some(QuizPhase::Complete)
                }
            }
            _ => None,
        }
    }

    pub fn question_index(&self) -> Option<usize> {
        match self {
            QuizPhase::Unanswered { index, .. } | QuizPhase::Answered { index, .. } => {
                Some(*index)
            }
            QuizPhase::Complete => None,
        }
    }
}

/// Outcome of one submitted question
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionResult {
    pub selected: usize,
    pub correct: bool,
    pub points: u32,
}

/// Running quiz
#[derive(Clone, Debug)]
pub struct QuizMachine {
    config: QuizConfig,
    phase: QuizPhase,
    score: u32,
    results: Vec<Option<QuestionResult>>,
}

impl QuizMachine {
    /// Start a quiz at the first question with score 0
    pub fn new(config: QuizConfig) -> Result<Self> {
        config.validate()?;
        let results = vec![None; config.questions.len()];
        Ok(Self {
            config,
            phase: QuizPhase::INITIAL,
            score: 0,
            results,
        })
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.config.max_score()
    }

    pub fn question_count(&self) -> usize {
        self.config.questions.len()
    }

    pub fn current_question(&self) -> Option<&McqQuestion> {
        self.phase
            .question_index()
            .and_then(|i| self.config.questions.get(i))
    }

    pub fn selected_option(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Unanswered { selected, .. } => selected,
            QuizPhase::Answered { selected, .. } => Some(selected),
            QuizPhase::Complete => None,
        }
    }

    pub fn feedback_visible(&self) -> bool {
        matches!(self.phase, QuizPhase::Answered { .. })
    }

    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Complete
    }

    /// Per-question outcomes, `None` for questions not yet submitted
    pub fn results(&self) -> &[Option<QuestionResult>] {
        &self.results
    }

    /// Tentatively select an option
    ///
    /// Returns `false` without changing anything when the current question
    /// has already been answered or the quiz is complete.
    pub fn select(&mut self, option: usize) -> Result<bool> {
        if !matches!(self.phase, QuizPhase::Unanswered { .. }) {
            return Ok(false);
        }
        let Some(question) = self.current_question() else {
            return Ok(false);
        };
        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                option,
                options: question.options.len(),
            });
        }

        match self.transition(QuizEvent::Select(option)) {
            Some(next) => {
                self.phase = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Grade the selected option and commit its score
    ///
    /// Returns the response to record when the question is tracked.
    pub fn submit(&mut self) -> Result<Option<InteractionResponse>> {
        match self.phase {
            QuizPhase::Complete => return Err(QuizError::QuizComplete),
            QuizPhase::Answered { index, .. } => return Err(QuizError::AlreadyAnswered(index)),
            QuizPhase::Unanswered { selected: None, .. } => {
                return Err(QuizError::NothingSelected)
            }
            QuizPhase::Unanswered { .. } => {}
        }

        let next = self
            .transition(QuizEvent::Submit)
            .ok_or(QuizError::NothingSelected)?;
        let QuizPhase::Answered {
            index,
            selected,
            correct,
        } = next
        else {
            return Err(QuizError::NothingSelected);
        };

        let question = &self.config.questions[index];
        let points = if correct {
            self.config.scoring.points_for(question)
        } else {
            0
        };
        // Validated configs cannot overflow
        self.score = self.score.saturating_add(points);
        self.results[index] = Some(QuestionResult {
            selected,
            correct,
            points,
        });
        self.phase = next;

        tracing::debug!(
            question = index,
            selected,
            correct,
            score = self.score,
            "quiz answer submitted"
        );

        Ok(question.interaction.as_ref().map(|descriptor| {
            descriptor
                .respond(question.options[selected].clone())
                .correct(correct)
                .mcq(question.prompt.clone(), question.options.clone())
                .build()
        }))
    }

    /// Advance past an answered question
    pub fn next(&mut self) -> Result<QuizPhase> {
        if let QuizPhase::Unanswered { index, .. } = self.phase {
            return Err(QuizError::NotAnswered(index));
        }
        let next = self
            .transition(QuizEvent::Next)
            .ok_or(QuizError::QuizComplete)?;
        self.phase = next;
        if next == QuizPhase::Complete {
            tracing::debug!(score = self.score, max = self.max_score(), "quiz complete");
        }
        Ok(next)
    }

    /// Return to the first question with score 0
    pub fn reset(&mut self) {
        self.phase = QuizPhase::INITIAL;
        self.score = 0;
        self.results.iter_mut().for_each(|r| *r = None);
    }

    /// Dispatch an event to the matching operation
    pub fn send(&mut self, event: QuizEvent) -> Result<Option<InteractionResponse>> {
        match event {
            QuizEvent::Select(option) => self.select(option).map(|_| None),
            QuizEvent::Submit => self.submit(),
            QuizEvent::Next => self.next().map(|_| None),
            QuizEvent::Reset => {
                self.reset();
                Ok(None)
            }
        }
    }

    fn transition(&self, event: QuizEvent) -> Option<QuizPhase> {
        let correct_index = self
            .current_question()
            .map(|q| q.correct_index)
            .unwrap_or_default();
        self.phase
            .on_event(event, correct_index, self.question_count())
    }
}
