//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};

/// Normalize a dictionary term for storage and comparison
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Case-insensitive comparison of two dictionary terms
pub fn same_term(a: &str, b: &str) -> bool {
    normalize_term(a) == normalize_term(b)
}

/// Uppercase the first character, used when listing words
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a duration in seconds as minutes with one decimal place
pub fn format_minutes(duration_secs: i64) -> String {
    format!("{:.1}", duration_secs.max(0) as f64 / 60.0)
}

/// Format a timestamp as a calendar day
pub fn format_day(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d.%m.%Y").to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
