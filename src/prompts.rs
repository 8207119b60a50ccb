use crate::models::quiz::{OPTIONS_PER_QUESTION, QUESTIONS_PER_QUIZ};

/// Builds the generation prompt for a quiz over `text`, optionally steering
/// questions toward `topic`.
pub fn build_quiz_prompt(text: &str, topic: Option<&str>) -> String {
    let focus = match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => format!("\nFocus the questions on this topic: {}\n", topic),
        None => String::new(),
    };

    format!(
        r#"Create a quiz with {count} multiple-choice questions based on this text:
{text}
{focus}
Return ONLY a JSON array with exactly this format:
[
    {{
        "question": "What is...",
        "options": ["A", "B", "C", "D"],
        "correct": "A"
    }}
]

Rules:
1. Create exactly {count} questions
2. Each question must have exactly {options} options
3. The "correct" value must be copied exactly from the options array
4. Questions should test different aspects of the text
5. Use double quotes for every key and string value
6. Return ONLY the JSON array, no markdown fences and no other text
"#,
        count = QUESTIONS_PER_QUIZ,
        options = OPTIONS_PER_QUESTION,
        text = text.trim(),
        focus = focus,
    )
}
