//! Test data

use WordBuddy::services::tutor::UserRef;

/// Shared dictionary used by most tests, `(english, russian)`
pub const SHARED_WORDS: &[(&str, &str)] = &[
    ("cat", "кот"),
    ("dog", "собака"),
    ("house", "дом"),
    ("water", "вода"),
    ("sun", "солнце"),
];

pub fn test_user_id() -> i64 {
    987654321
}

pub fn test_user() -> UserRef {
    UserRef {
        id: test_user_id(),
        first_name: Some("Anna".to_string()),
        username: Some("anna_learns".to_string()),
        language_code: Some("ru".to_string()),
    }
}

pub fn other_user() -> UserRef {
    UserRef {
        id: 123456789,
        first_name: Some("Ivan".to_string()),
        username: None,
        language_code: Some("en".to_string()),
    }
}
