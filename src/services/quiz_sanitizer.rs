use crate::models::quiz::{QuizItem, OPTIONS_PER_QUESTION};
use serde_json::{Map, Value as JsonValue};

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("response is not a JSON array")]
    NotAnArray,
    #[error("no usable quiz items in response")]
    NoUsableItems,
}

/// Coerces a parsed model reply into quiz items, repairing what can be
/// repaired and dropping the rest.
///
/// The returned batch may hold more or fewer items than a full quiz; sizing
/// is the caller's decision.
pub fn validate_and_fix(parsed: &JsonValue) -> Result<Vec<QuizItem>, Rejected> {
    let entries = parsed.as_array().ok_or(Rejected::NotAnArray)?;

    let items: Vec<QuizItem> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let item = coerce_item(entry);
            if item.is_none() {
                tracing::debug!(index = idx, "Dropping unusable quiz item");
            }
            item
        })
        .collect();

    if items.is_empty() {
        return Err(Rejected::NoUsableItems);
    }
    Ok(items)
}

fn coerce_item(entry: &JsonValue) -> Option<QuizItem> {
    let mut fields = entry.as_object()?.clone();
    rename_alias(&mut fields, "options", &["choices"]);
    rename_alias(&mut fields, "correct", &["answer", "correctAnswer"]);

    let question = scalar_text(fields.get("question")?)?;
    if question.trim().is_empty() {
        return None;
    }

    let mut options: Vec<String> = fields
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(option_text)
        .collect();
    if options.len() < MIN_OPTIONS {
        return None;
    }

    // Present but unusable answers still go through the first-option fallback.
    let correct = scalar_text(fields.get("correct")?);

    options.truncate(OPTIONS_PER_QUESTION);
    while options.len() < OPTIONS_PER_QUESTION {
        options.push(format!("Option {}", options.len() + 1));
    }

    let correct = match correct {
        Some(answer) if options.contains(&answer) => answer,
        _ => options[0].clone(),
    };

    Some(QuizItem {
        question,
        options,
        correct,
    })
}

fn rename_alias(fields: &mut Map<String, JsonValue>, canonical: &str, aliases: &[&str]) {
    if fields.contains_key(canonical) {
        return;
    }
    if let Some(value) = aliases.iter().find_map(|alias| fields.remove(*alias)) {
        fields.insert(canonical.to_string(), value);
    }
}

/// Nulls are skipped; arrays and objects are kept as their compact JSON text.
fn option_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::Array(_) | JsonValue::Object(_) => Some(value.to_string()),
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
