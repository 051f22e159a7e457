//! Likely-question generation and scoring, shared by the prediction
//! engine and the preload scheduler.

use prewarm_core::constants::MAX_LIKELY_QUESTIONS;
use prewarm_core::models::UserPattern;

/// Ranked questions the user is likely to ask next: topic templates per
/// preferred module, then historical messages that were questions, capped
/// at [`MAX_LIKELY_QUESTIONS`].
pub fn likely_questions(pattern: &UserPattern) -> Vec<String> {
    let mut questions = Vec::new();
    for topic in &pattern.preferred_topics {
        questions.push(format!("How does the {topic} module work?"));
        questions.push(format!("I need help with {topic}"));
    }
    for message in &pattern.message_patterns {
        if message.contains('?') {
            questions.push(message.clone());
        }
    }
    questions.truncate(MAX_LIKELY_QUESTIONS);
    questions
}

/// Priority for preloading one question's response: base 5, +3 when the
/// question mentions a preferred topic, +2 for frequent users, capped 10.
pub fn question_priority(pattern: &UserPattern, question: &str) -> i32 {
    let mut priority = 5;
    let lower = question.to_lowercase();
    if pattern.preferred_topics.iter().any(|t| lower.contains(&t.to_lowercase())) {
        priority += 3;
    }
    if pattern.interaction_frequency > 2.0 {
        priority += 2;
    }
    priority.min(10)
}

/// Expected usefulness of preloading one question's response: base 0.5,
/// +0.3 on a preferred-topic mention, +0.2 with an established message
/// history, capped 1.0.
pub fn question_value(pattern: &UserPattern, question: &str) -> f64 {
    let mut value: f64 = 0.5;
    let lower = question.to_lowercase();
    if pattern.preferred_topics.iter().any(|t| lower.contains(&t.to_lowercase())) {
        value += 0.3;
    }
    if pattern.message_patterns.len() > 10 {
        value += 0.2;
    }
    value.min(1.0)
}
