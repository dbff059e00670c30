//! Terminal quiz runner
//!
//! Mounts a slide from a [`SlideDocument`], drives its quiz from line input
//! and reports every graded response through the slide wrapper.

use crate::document::SlideDocument;
use anyhow::Result;
use lumen_core::{InteractionRegistry, QuizMachine, QuizPhase, RecordingHost, Slide, SlideHost};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a play session
#[derive(Debug)]
pub struct PlayReport {
    pub score: u32,
    pub max_score: u32,
    pub completed: bool,
    /// Latest registry seen by the host
    pub registry: InteractionRegistry,
}

/// Parse an answer such as `b`, `B` or `2` into a zero-based option index
pub fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let input = input.trim();
    let index = match input.chars().next()? {
        c if c.is_ascii_alphabetic() && input.len() == 1 => {
            (c.to_ascii_lowercase() as u8 - b'a') as usize
        }
        _ => input.parse::<usize>().ok()?.checked_sub(1)?,
    };
    (index < option_count).then_some(index)
}

fn option_label(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

/// Run the document's quiz against `input`, writing prompts to `output`
pub fn play<R: BufRead, W: Write>(
    doc: &SlideDocument,
    mut input: R,
    output: &mut W,
    show_explanations: bool,
) -> Result<PlayReport> {
    let Some(config) = doc.quiz_config()? else {
        anyhow::bail!("Slide '{}' has no quiz to play", doc.slide.slide_id);
    };

    let host = Arc::new(RecordingHost::new());
    let slide = Slide::mount(
        doc.ids(),
        doc.interactions.iter().cloned(),
        Arc::clone(&host) as Arc<dyn SlideHost>,
    )?;
    let mut quiz = QuizMachine::new(config)?;

    info!("Playing {} ({} questions)", doc.title(), quiz.question_count());
    writeln!(output, "== {} ==", doc.title())?;

    let mut line = String::new();
    while let QuizPhase::Unanswered { index, .. } = quiz.phase() {
        let Some(question) = quiz.current_question().cloned() else {
            break;
        };

        writeln!(output)?;
        writeln!(output, "Q{}. {}", index + 1, question.prompt)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(output, "  {}) {}", option_label(i), option)?;
        }

        let choice = loop {
            write!(output, "> ")?;
            output.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("input closed before question {}", index + 1);
                break None;
            }
            match parse_choice(&line, question.options.len()) {
                Some(choice) => break Some(choice),
                None => writeln!(
                    output,
                    "Enter a letter (a-{}) or a number (1-{})",
                    option_label(question.options.len() - 1),
                    question.options.len()
                )?,
            }
        };
        let Some(choice) = choice else {
            break;
        };

        quiz.select(choice)?;
        if let Some(response) = quiz.submit()? {
            slide.record_response(response);
        }

        match quiz.phase() {
            QuizPhase::Answered { correct: true, .. } => writeln!(output, "Correct!")?,
            _ => writeln!(
                output,
                "Incorrect. The answer is {}) {}",
                option_label(question.correct_index),
                question.correct_option().unwrap_or_default()
            )?,
        }
        if show_explanations {
            if let Some(explanation) = &question.explanation {
                writeln!(output, "  {}", explanation)?;
            }
        }

        quiz.next()?;
    }

    let completed = quiz.is_complete();
    writeln!(output)?;
    if completed {
        writeln!(output, "Score: {}/{}", quiz.score(), quiz.max_score())?;
    } else {
        writeln!(output, "Stopped early. Score so far: {}", quiz.score())?;
    }

    let registry = host
        .latest(&doc.slide.slide_id)
        .unwrap_or_else(|| slide.registry());

    Ok(PlayReport {
        score: quiz.score(),
        max_score: quiz.max_score(),
        completed,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DOC: &str = r#"
[slide]
slide_id = "cells"
module_id = "biology"
submodule_id = "cell-structure"

[[interactions]]
id = "atp"
conceptId = "cells.mitochondria"
conceptName = "Mitochondria"
type = "judging"

[quiz]
[[quiz.questions]]
prompt = "Which organelle produces ATP?"
options = ["Nucleus", "Mitochondrion", "Ribosome", "Golgi body"]
correct = 1
explanation = "Cellular respiration happens in the mitochondria."
interaction = "atp"

[[quiz.questions]]
prompt = "Do plant cells have a cell wall?"
options = ["Yes", "No"]
correct = 0
"#;

    fn run(input: &str) -> (PlayReport, String) {
        let doc = SlideDocument::parse(DOC).unwrap();
        let mut out = Vec::new();
        let report = play(&doc, Cursor::new(input.to_string()), &mut out, true).unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("a", 4), Some(0));
        assert_eq!(parse_choice(" D\n", 4), Some(3));
        assert_eq!(parse_choice("2", 4), Some(1));
        assert_eq!(parse_choice("e", 4), None);
        assert_eq!(parse_choice("0", 4), None);
        assert_eq!(parse_choice("", 4), None);
        assert_eq!(parse_choice("ab", 4), None);
    }

    #[test]
    fn test_all_correct() {
        let (report, out) = run("b\n1\n");
        assert!(report.completed);
        assert_eq!(report.score, 2);
        assert_eq!(report.max_score, 2);
        assert!(out.contains("Correct!"));
        assert!(out.contains("Cellular respiration"));
        assert!(out.contains("Score: 2/2"));

        let atp = report.registry.get("atp").unwrap();
        assert_eq!(atp.value, "Mitochondrion");
        assert_eq!(atp.is_correct, Some(true));
        // Second question is untracked
        assert_eq!(report.registry.len(), 1);
    }

    #[test]
    fn test_wrong_answer_and_retry_prompt() {
        let (report, out) = run("x\na\nb\n");
        assert_eq!(report.score, 0);
        assert!(out.contains("Enter a letter"));
        assert!(out.contains("Incorrect. The answer is b) Mitochondrion"));
        assert_eq!(report.registry.get("atp").unwrap().is_correct, Some(false));
    }

    #[test]
    fn test_input_closed_early() {
        let (report, out) = run("b\n");
        assert!(!report.completed);
        assert_eq!(report.score, 1);
        assert!(out.contains("Stopped early"));
    }

    #[test]
    fn test_document_without_quiz() {
        let text = "[slide]\nslide_id = \"s\"\nmodule_id = \"m\"\nsubmodule_id = \"x\"\n";
        let doc = SlideDocument::parse(text).unwrap();
        let mut out = Vec::new();
        assert!(play(&doc, Cursor::new(String::new()), &mut out, true).is_err());
    }
}
