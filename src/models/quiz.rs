use serde::{Deserialize, Serialize};

pub const QUESTIONS_PER_QUIZ: usize = 10;
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
}

impl QuizItem {
    /// Synthetic item used to top a short batch up to a full quiz.
    pub fn filler(subject: &str) -> Self {
        let options: Vec<String> = ["Option A", "Option B", "Option C", "Option D"]
            .iter()
            .map(|o| o.to_string())
            .collect();
        Self {
            question: format!("Additional question about {}?", subject),
            correct: options[0].clone(),
            options,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == OPTIONS_PER_QUESTION
            && self.options.contains(&self.correct)
    }
}

/// A complete quiz. Serializes as a bare JSON array of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quiz(Vec<QuizItem>);

impl Quiz {
    /// Builds a quiz of exactly `QUESTIONS_PER_QUIZ` items, dropping extras
    /// and appending fillers about `subject` when short.
    pub fn complete(mut items: Vec<QuizItem>, subject: &str) -> Self {
        items.truncate(QUESTIONS_PER_QUIZ);
        while items.len() < QUESTIONS_PER_QUIZ {
            items.push(QuizItem::filler(subject));
        }
        Self(items)
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
