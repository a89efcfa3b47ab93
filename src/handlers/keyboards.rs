//! Keyboard rendering and button parsing
//!
//! The only place where button labels and callback payloads are mapped to
//! [`UserEvent`]s and typed keyboards are turned into teloxide markup.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup};

use crate::i18n::I18n;
use crate::quiz::AnswerOption;
use crate::services::tutor::{Keyboard, UserEvent};

pub const ANSWER_PREFIX: &str = "ans:";
pub const PRONOUNCE: &str = "say";
pub const END_QUIZ: &str = "end";
pub const RESET_ASK: &str = "reset:ask";
pub const RESET_CONFIRM: &str = "reset:yes";
pub const RESET_CANCEL: &str = "reset:no";
pub const ADD_MORE: &str = "flow:add_more";
pub const DELETE_MORE: &str = "flow:delete_more";
pub const TO_MAIN: &str = "flow:main";
pub const CLEAR_STATS: &str = "stats:clear";

/// Main menu reply keyboard
pub fn main_menu(i18n: &I18n, lang: &str) -> KeyboardMarkup {
    let button = |key: &str| KeyboardButton::new(i18n.t(key, lang, None));
    KeyboardMarkup::new(vec![
        vec![button("menu.start_quiz")],
        vec![button("menu.add_word"), button("menu.delete_word")],
        vec![button("menu.my_words"), button("menu.stats")],
    ])
    .resize_keyboard()
}

/// Answer buttons of a question, followed by the pronounce and end controls
pub fn answer_keyboard(options: &[AnswerOption], i18n: &I18n, lang: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .map(|o| vec![InlineKeyboardButton::callback(o.text.clone(), format!("{}{}", ANSWER_PREFIX, o.render_id))])
        .collect();
    rows.push(vec![
        InlineKeyboardButton::callback(i18n.t("buttons.pronounce", lang, None), PRONOUNCE),
        InlineKeyboardButton::callback(i18n.t("buttons.end_quiz", lang, None), END_QUIZ),
    ]);
    InlineKeyboardMarkup::new(rows)
}

/// Markup for a typed keyboard, `None` when the message carries no buttons
pub fn render(keyboard: Keyboard, i18n: &I18n, lang: &str) -> Option<ReplyMarkup> {
    let button = |key: &str, data: &'static str| InlineKeyboardButton::callback(i18n.t(key, lang, None), data);

    let markup = match keyboard {
        Keyboard::None => return None,
        Keyboard::MainMenu => return Some(main_menu(i18n, lang).into()),
        Keyboard::AfterAdd => InlineKeyboardMarkup::new(vec![
            vec![button("buttons.add_another", ADD_MORE)],
            vec![button("buttons.main_menu", TO_MAIN)],
        ]),
        Keyboard::AfterDelete => InlineKeyboardMarkup::new(vec![
            vec![button("buttons.delete_another", DELETE_MORE)],
            vec![button("buttons.main_menu", TO_MAIN)],
        ]),
        Keyboard::ResetProgress => InlineKeyboardMarkup::new(vec![vec![button("buttons.reset_progress", RESET_ASK)]]),
        Keyboard::ConfirmReset => InlineKeyboardMarkup::new(vec![vec![
            button("buttons.confirm_reset", RESET_CONFIRM),
            button("buttons.cancel_reset", RESET_CANCEL),
        ]]),
        Keyboard::Stats => InlineKeyboardMarkup::new(vec![vec![button("buttons.clear_stats", CLEAR_STATS)]]),
    };
    Some(markup.into())
}

/// Event for an inline button payload
pub fn parse_callback(data: &str) -> Option<UserEvent> {
    if let Some(render_id) = data.strip_prefix(ANSWER_PREFIX) {
        return (!render_id.is_empty()).then(|| UserEvent::Answer { render_id: render_id.to_string() });
    }

    match data {
        PRONOUNCE => Some(UserEvent::Pronounce),
        END_QUIZ => Some(UserEvent::EndQuiz),
        RESET_ASK => Some(UserEvent::RequestReset),
        RESET_CONFIRM => Some(UserEvent::ConfirmReset),
        RESET_CANCEL => Some(UserEvent::CancelReset),
        ADD_MORE => Some(UserEvent::AddAnother),
        DELETE_MORE => Some(UserEvent::DeleteAnother),
        TO_MAIN => Some(UserEvent::ReturnToMain),
        CLEAR_STATS => Some(UserEvent::ClearStats),
        _ => None,
    }
}

/// Event for a main-menu label in any supported language
pub fn menu_event(text: &str, i18n: &I18n) -> Option<UserEvent> {
    let text = text.trim();
    let entries: [(&str, UserEvent); 6] = [
        ("menu.start_quiz", UserEvent::StartQuiz),
        ("menu.add_word", UserEvent::AddWord),
        ("menu.delete_word", UserEvent::DeleteWord),
        ("menu.my_words", UserEvent::ListWords),
        ("menu.stats", UserEvent::ShowStats),
        ("menu.main", UserEvent::ReturnToMain),
    ];

    entries.into_iter().find_map(|(key, event)| {
        i18n.supported_languages()
            .iter()
            .any(|lang| i18n.t(key, lang, None) == text)
            .then_some(event)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::I18nConfig;

    async fn i18n() -> I18n {
        let mut i18n = I18n::new(&I18nConfig {
            default_language: "ru".to_string(),
            supported_languages: vec!["ru".to_string(), "en".to_string()],
            translations_dir: "translations".to_string(),
        });
        i18n.load_translations().await.unwrap();
        i18n
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(parse_callback("ans:abc123"), Some(UserEvent::Answer { render_id: "abc123".to_string() }));
        assert_eq!(parse_callback("ans:"), None);
        assert_eq!(parse_callback("reset:yes"), Some(UserEvent::ConfirmReset));
        assert_eq!(parse_callback("flow:main"), Some(UserEvent::ReturnToMain));
        assert_eq!(parse_callback("lang:en"), None);
    }

    #[tokio::test]
    async fn test_menu_labels_match_in_every_language() {
        let i18n = i18n().await;
        let ru = i18n.t("menu.start_quiz", "ru", None);
        let en = i18n.t("menu.add_word", "en", None);
        assert_eq!(menu_event(&ru, &i18n), Some(UserEvent::StartQuiz));
        assert_eq!(menu_event(&format!(" {} ", en), &i18n), Some(UserEvent::AddWord));
        assert_eq!(menu_event("кот", &i18n), None);
    }

    #[tokio::test]
    async fn test_answer_keyboard_layout() {
        let i18n = i18n().await;
        let options = vec![
            AnswerOption { render_id: "a1".to_string(), text: "кот".to_string() },
            AnswerOption { render_id: "b2".to_string(), text: "дом".to_string() },
        ];
        let markup = answer_keyboard(&options, &i18n, "ru");
        assert_eq!(markup.inline_keyboard.len(), 3);
        assert_eq!(markup.inline_keyboard[0][0].text, "кот");
        assert_eq!(markup.inline_keyboard[2].len(), 2);
        assert!(render(Keyboard::None, &i18n, "ru").is_none());
        assert!(render(Keyboard::ConfirmReset, &i18n, "ru").is_some());
    }
}
