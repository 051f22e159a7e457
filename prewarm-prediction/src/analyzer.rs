//! Pattern extraction from interaction history.
//!
//! A pure recompute: the whole pattern is derived from the history on
//! every pass, never incrementally patched.

use chrono::{Timelike, Utc};

use prewarm_core::config::PreloaderConfig;
use prewarm_core::models::{Interaction, UserPattern};

/// Derive a [`UserPattern`] from a time-ordered history (oldest first).
///
/// Message samples keep the most recent `message_window` non-empty
/// messages; module usage and the hour histogram cover the full history.
/// Interaction frequency is per hour with the denominator clamped to one
/// hour, so a burst of messages inside a minute doesn't explode the rate.
pub fn analyze(user_id: &str, interactions: &[Interaction], config: &PreloaderConfig) -> UserPattern {
    let mut pattern = UserPattern::empty(user_id);
    if interactions.is_empty() {
        return pattern;
    }

    let messages: Vec<&str> = interactions
        .iter()
        .map(|i| i.message.as_str())
        .filter(|m| !m.is_empty())
        .collect();
    if !messages.is_empty() {
        let window_start = messages.len().saturating_sub(config.message_window);
        pattern.message_patterns = messages[window_start..]
            .iter()
            .map(|m| m.to_string())
            .collect();
        pattern.average_message_length = messages
            .iter()
            .map(|m| m.chars().count() as f64)
            .sum::<f64>()
            / messages.len() as f64;
    }

    for interaction in interactions {
        if !interaction.module_id.is_empty() {
            *pattern
                .module_usage
                .entry(interaction.module_id.clone())
                .or_insert(0) += 1;
        }
        pattern.hour_histogram[interaction.timestamp.hour() as usize] += 1;
    }

    pattern.preferred_topics = preferred_topics(interactions, config.top_topics);

    let span = interactions[interactions.len() - 1]
        .timestamp
        .signed_duration_since(interactions[0].timestamp);
    let span_hours = (span.num_milliseconds().max(0) as f64 / 3_600_000.0).max(1.0);
    pattern.interaction_frequency = interactions.len() as f64 / span_hours;

    pattern.last_updated = Utc::now();
    pattern
}

/// Top modules by usage count; ties broken by most recent use.
fn preferred_topics(interactions: &[Interaction], top: usize) -> Vec<String> {
    // (module, count, index of most recent use)
    let mut stats: Vec<(String, u64, usize)> = Vec::new();
    for (index, interaction) in interactions.iter().enumerate() {
        if interaction.module_id.is_empty() {
            continue;
        }
        match stats.iter_mut().find(|(m, _, _)| *m == interaction.module_id) {
            Some((_, count, last)) => {
                *count += 1;
                *last = index;
            }
            None => stats.push((interaction.module_id.clone(), 1, index)),
        }
    }
    stats.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
    stats.into_iter().take(top).map(|(m, _, _)| m).collect()
}
