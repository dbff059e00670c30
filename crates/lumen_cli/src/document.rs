//! Slide documents
//!
//! A slide document is a TOML file declaring a slide's identity, its tracked
//! interactions and an optional quiz:
//!
//! ```toml
//! [slide]
//! slide_id = "freefall"
//! module_id = "mechanics"
//! submodule_id = "kinematics"
//! title = "Free fall"
//!
//! [[interactions]]
//! id = "freefall-q1"
//! conceptId = "kinematics.freefall"
//! conceptName = "Free fall"
//! type = "judging"
//!
//! [quiz]
//! scoring = "per_correct"
//!
//! [[quiz.questions]]
//! prompt = "What is g on Earth?"
//! options = ["1.6 m/s²", "9.8 m/s²", "24.8 m/s²"]
//! correct = 1
//! interaction = "freefall-q1"
//! ```

use anyhow::{Context, Result};
use lumen_core::{InteractionDescriptor, McqQuestion, QuizConfig, ScoringPolicy, SlideIds};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parsed slide document
#[derive(Debug, Deserialize)]
pub struct SlideDocument {
    pub slide: SlideSection,
    #[serde(default)]
    pub interactions: Vec<InteractionDescriptor>,
    #[serde(default)]
    pub quiz: Option<QuizSection>,
}

#[derive(Debug, Deserialize)]
pub struct SlideSection {
    pub slide_id: String,
    pub module_id: String,
    pub submodule_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSection {
    #[serde(default)]
    pub scoring: ScoringPolicy,
    pub questions: Vec<QuestionEntry>,
}

/// Question as written in a document; `interaction` names a declared id
#[derive(Debug, Deserialize)]
pub struct QuestionEntry {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub interaction: Option<String>,
}

impl SlideDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn ids(&self) -> SlideIds {
        SlideIds::new(
            &self.slide.slide_id,
            &self.slide.module_id,
            &self.slide.submodule_id,
        )
    }

    pub fn title(&self) -> &str {
        self.slide.title.as_deref().unwrap_or(&self.slide.slide_id)
    }

    /// Build the quiz config, resolving question interactions by id
    pub fn quiz_config(&self) -> Result<Option<QuizConfig>> {
        let Some(quiz) = &self.quiz else {
            return Ok(None);
        };

        let mut questions = Vec::with_capacity(quiz.questions.len());
        for (index, entry) in quiz.questions.iter().enumerate() {
            let mut question =
                McqQuestion::new(entry.prompt.clone(), entry.options.clone(), entry.correct);
            if let Some(points) = entry.points {
                question = question.points(points);
            }
            if let Some(explanation) = &entry.explanation {
                question = question.explanation(explanation.clone());
            }
            if let Some(id) = &entry.interaction {
                let descriptor = self.descriptor(id).with_context(|| {
                    format!("Question {} references undeclared interaction '{}'", index + 1, id)
                })?;
                if !descriptor.kind.is_graded() {
                    tracing::warn!(
                        "Question {} is tracked by learning interaction '{}'",
                        index + 1,
                        id
                    );
                }
                question = question.tracked_by(descriptor.clone());
            }
            questions.push(question);
        }

        let config = QuizConfig::new(questions).scoring(quiz.scoring);
        config.validate()?;
        Ok(Some(config))
    }

    /// Check the document without running it
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for descriptor in &self.interactions {
            if !seen.insert(descriptor.id.as_str()) {
                anyhow::bail!("Interaction '{}' is declared more than once", descriptor.id);
            }
        }
        self.quiz_config()?;
        Ok(())
    }

    fn descriptor(&self, id: &str) -> Option<&InteractionDescriptor> {
        self.interactions.iter().find(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREEFALL: &str = r#"
[slide]
slide_id = "freefall"
module_id = "mechanics"
submodule_id = "kinematics"
title = "Free fall"

[[interactions]]
id = "q1"
conceptId = "kinematics.freefall"
conceptName = "Free fall"
type = "judging"
description = "Gravitational acceleration"

[[interactions]]
id = "q2"
conceptId = "kinematics.freefall"
conceptName = "Free fall"
type = "judging"

[quiz]
[[quiz.questions]]
prompt = "What is g on Earth?"
options = ["1.6 m/s²", "9.8 m/s²", "24.8 m/s²"]
correct = 1
explanation = "Near the surface g is about 9.8 m/s²."
interaction = "q1"

[[quiz.questions]]
prompt = "Does a heavier ball fall faster in vacuum?"
options = ["Yes", "No"]
correct = 1
interaction = "q2"
"#;

    #[test]
    fn test_parse_document() {
        let doc = SlideDocument::parse(FREEFALL).unwrap();
        assert_eq!(doc.title(), "Free fall");
        assert_eq!(doc.ids().submodule_id, "kinematics");
        assert_eq!(doc.interactions.len(), 2);

        let config = doc.quiz_config().unwrap().unwrap();
        assert_eq!(config.questions.len(), 2);
        assert_eq!(
            config.questions[0].interaction.as_ref().map(|d| d.id.as_str()),
            Some("q1")
        );
        assert_eq!(config.scoring, ScoringPolicy::PerCorrect);
        doc.validate().unwrap();
    }

    #[test]
    fn test_undeclared_interaction_rejected() {
        let text = FREEFALL.replace("interaction = \"q2\"", "interaction = \"q9\"");
        let doc = SlideDocument::parse(&text).unwrap();
        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("q9"));
    }

    #[test]
    fn test_duplicate_interaction_rejected() {
        let text = FREEFALL.replace("id = \"q2\"", "id = \"q1\"");
        let doc = SlideDocument::parse(&text).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_invalid_quiz_rejected() {
        let text = FREEFALL.replace("correct = 1\nexplanation", "correct = 7\nexplanation");
        let doc = SlideDocument::parse(&text).unwrap();
        assert!(doc.quiz_config().is_err());
    }

    #[test]
    fn test_slide_without_quiz() {
        let doc = SlideDocument::parse(
            "[slide]\nslide_id = \"s\"\nmodule_id = \"m\"\nsubmodule_id = \"sm\"\n",
        )
        .unwrap();
        assert!(doc.quiz_config().unwrap().is_none());
        assert_eq!(doc.title(), "s");
    }
}
