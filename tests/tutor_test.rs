//! End-to-end tutor journeys over in-memory collaborators

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use helpers::*;
use WordBuddy::database::WordPoolStore;
use WordBuddy::services::tutor::{Keyboard, Reply, UserEvent};
use WordBuddy::state::context::ConversationState;
use WordBuddy::state::session::EndReason;

#[tokio::test]
async fn test_new_user_gets_shared_question() {
    let ctx = TestContext::new().await;
    let user = test_user();

    let replies = ctx.send(&user, UserEvent::StartQuiz).await;

    assert!(has_question(&replies));
    let question = ctx.current_question(&user);
    assert!(SHARED_WORDS.iter().any(|(en, ru)| *en == question.prompt_term && *ru == question.correct_answer));
    assert_eq!(question.options.len(), 4);
    assert!(question.options.iter().any(|o| o.text == question.correct_answer));
    assert!(ctx.sessions().is_active(user.id));
}

#[tokio::test]
async fn test_start_greets_and_registers_user() {
    let ctx = TestContext::new().await;
    let user = test_user();

    let replies = ctx.send(&user, UserEvent::Start).await;

    assert_matches!(&replies[..], [Reply::Text { text, keyboard: Keyboard::MainMenu }] if text.contains("Anna"));
    // Registration is idempotent
    ctx.send(&user, UserEvent::Start).await;
    assert_eq!(ctx.pool.count_progress(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_correct_answer_records_progress_and_moves_on() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    let first = ctx.current_question(&user);

    let replies = ctx.answer_correctly(&user).await;

    let phrases = ctx.i18n.list("quiz.correct", "ru");
    assert_matches!(&replies[0], Reply::Toast { text } if phrases.contains(text));
    assert!(has_question(&replies));
    assert_ne!(ctx.current_question(&user).word, first.word);
    assert_eq!(ctx.pool.progress_of(user.id).len(), 1);
}

#[tokio::test]
async fn test_wrong_answer_rebuilds_options_for_same_word() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    let before = ctx.current_question(&user);

    let replies = ctx.answer_wrong(&user).await;

    assert_matches!(&replies[..], [Reply::Toast { .. }, Reply::EditOptions { .. }]);
    let after = ctx.current_question(&user);
    assert_eq!(after.word, before.word);
    assert_eq!(after.correct_answer, before.correct_answer);
    assert!(after.options.iter().all(|o| before.options.iter().all(|b| b.render_id != o.render_id)));
    assert!(ctx.pool.progress_of(user.id).is_empty());

    // The old buttons no longer resolve
    let stale = before.options[0].render_id.clone();
    let replies = ctx.send(&user, UserEvent::Answer { render_id: stale }).await;
    assert_eq!(texts(&replies), vec![ctx.t("errors.stale_session")]);
}

#[tokio::test]
async fn test_session_counts_words_learned_in_window() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    ctx.clock.advance(chrono::Duration::seconds(5));
    ctx.answer_correctly(&user).await;
    ctx.clock.advance(chrono::Duration::seconds(7));
    ctx.answer_correctly(&user).await;
    ctx.clock.advance(chrono::Duration::seconds(8));

    let replies = ctx.send(&user, UserEvent::EndQuiz).await;
    assert_matches!(&replies[..], [Reply::Text { keyboard: Keyboard::MainMenu, .. }]);

    let records = ctx.pool.list_session_records(user.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].learned_words, 2);
    assert_eq!(records[0].duration_secs, 20);
    assert!(!ctx.sessions().is_active(user.id));
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_expires_once() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    tokio::time::sleep(Duration::from_secs(901)).await;

    assert!(!ctx.sessions().is_active(user.id));
    let notices = ctx.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].reason, EndReason::Timeout);

    tokio::time::sleep(Duration::from_secs(1800)).await;
    assert_eq!(ctx.notifier.notices().len(), 1);
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_answers_keep_session_alive() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(600)).await;
        ctx.answer_wrong(&user).await;
    }

    assert!(ctx.sessions().is_active(user.id));
    assert!(ctx.notifier.notices().is_empty());
    assert_eq!(ctx.sessions().pending_timers(), 1);
}

#[tokio::test]
async fn test_answer_without_question_is_stale() {
    let ctx = TestContext::new().await;
    let user = test_user();

    let replies = ctx
        .send(&user, UserEvent::Answer { render_id: "0123456789abcdef".to_string() })
        .await;

    assert_matches!(&replies[..], [Reply::Toast { text }] if *text == ctx.t("errors.stale_session"));
    assert!(!ctx.sessions().is_active(user.id));
    assert!(ctx.pool.progress_of(user.id).is_empty());
    assert!(ctx.pool.list_session_records(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_pool_offers_reset() {
    let ctx = TestContext::new_with_config(TestConfig {
        shared_words: vec![("cat", "кот"), ("dog", "собака")],
        ..TestConfig::default()
    })
    .await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    ctx.answer_correctly(&user).await;

    let replies = ctx.answer_correctly(&user).await;

    assert!(!has_question(&replies));
    assert_matches!(replies.last(), Some(Reply::Text { keyboard: Keyboard::ResetProgress, .. }));
    assert!(!ctx.sessions().is_active(user.id));
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap()[0].learned_words, 2);

    // Reset asks first, cancelling keeps progress
    let replies = ctx.send(&user, UserEvent::RequestReset).await;
    assert_matches!(&replies[..], [Reply::Text { keyboard: Keyboard::ConfirmReset, .. }]);
    ctx.send(&user, UserEvent::CancelReset).await;
    assert_eq!(ctx.pool.progress_of(user.id).len(), 2);

    let replies = ctx.send(&user, UserEvent::RequestReset).await;
    assert_eq!(replies.len(), 1);
    let replies = ctx.send(&user, UserEvent::ConfirmReset).await;
    assert!(has_question(&replies));
    assert!(ctx.pool.progress_of(user.id).is_empty());
    assert!(ctx.sessions().is_active(user.id));
}

#[tokio::test]
async fn test_adding_word_ends_running_quiz() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    let replies = ctx.send(&user, UserEvent::AddWord).await;

    assert!(!ctx.sessions().is_active(user.id));
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap().len(), 1);
    assert_eq!(texts(&replies).last(), Some(&ctx.t("add.prompt")));

    let replies = ctx.text(&user, "Яблоко").await;
    assert_matches!(&replies[..], [Reply::Text { keyboard: Keyboard::AfterAdd, .. }]);

    // Starting a quiz leaves the dialogue
    ctx.send(&user, UserEvent::StartQuiz).await;
    assert_eq!(ctx.flow().current_state(user.id).await.unwrap(), ConversationState::Idle);
    assert!(ctx.sessions().is_active(user.id));
}

#[tokio::test]
async fn test_personal_words_join_the_quiz() {
    let ctx = TestContext::new_with_config(TestConfig {
        shared_words: vec![("cat", "кот")],
        ..TestConfig::default()
    })
    .await;
    let user = test_user();
    ctx.send(&user, UserEvent::AddWord).await;
    ctx.text(&user, "груша").await;
    ctx.send(&user, UserEvent::ReturnToMain).await;

    ctx.send(&user, UserEvent::StartQuiz).await;
    ctx.answer_correctly(&user).await;
    let replies = ctx.answer_correctly(&user).await;

    assert_matches!(replies.last(), Some(Reply::Text { keyboard: Keyboard::ResetProgress, .. }));
    assert_eq!(ctx.pool.progress_of(user.id).len(), 2);
    // Another user never sees the personal word
    let other = other_user();
    ctx.send(&other, UserEvent::StartQuiz).await;
    assert_eq!(ctx.current_question(&other).prompt_term, "cat");
}

#[tokio::test]
async fn test_list_words_renders_pairs() {
    let ctx = TestContext::new().await;
    let user = test_user();

    let replies = ctx.send(&user, UserEvent::ListWords).await;
    assert_eq!(texts(&replies), vec![ctx.t("words.empty")]);

    ctx.send(&user, UserEvent::AddWord).await;
    ctx.text(&user, "яблоко").await;
    ctx.send(&user, UserEvent::AddAnother).await;
    ctx.text(&user, "мяч").await;

    let replies = ctx.send(&user, UserEvent::ListWords).await;
    let text = &texts(&replies)[0];
    assert!(text.contains("• Apple — Яблоко"));
    assert!(text.contains("• Ball — Мяч"));
    assert!(text.find("Apple") < text.find("Ball"));
}

#[tokio::test]
async fn test_pronounce_current_word() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    let question = ctx.current_question(&user);

    let replies = ctx.send(&user, UserEvent::Pronounce).await;

    assert_eq!(replies, vec![Reply::Voice { audio: question.prompt_term.as_bytes().to_vec() }]);
    assert_eq!(*ctx.speech.requests.lock().unwrap(), vec![question.prompt_term]);
}

#[tokio::test]
async fn test_pronounce_without_speech_service() {
    let ctx = TestContext::new_with_config(TestConfig {
        speech_enabled: false,
        ..TestConfig::default()
    })
    .await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    let replies = ctx.send(&user, UserEvent::Pronounce).await;

    assert_eq!(texts(&replies), vec![ctx.t("errors.speech_disabled")]);
    assert!(ctx.sessions().is_active(user.id));
}

#[tokio::test]
async fn test_stats_and_clearing_history() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    ctx.answer_correctly(&user).await;
    ctx.clock.advance(chrono::Duration::seconds(90));
    ctx.send(&user, UserEvent::EndQuiz).await;

    let replies = ctx.send(&user, UserEvent::ShowStats).await;
    assert_matches!(&replies[..], [Reply::Text { keyboard: Keyboard::Stats, text }] if text.contains("1.5"));

    let replies = ctx.send(&user, UserEvent::ClearStats).await;
    assert_eq!(texts(&replies), vec![ctx.t("stats.cleared")]);
    assert!(ctx.pool.list_session_records(user.id).await.unwrap().is_empty());
    assert_eq!(ctx.pool.progress_of(user.id).len(), 1);

    let replies = ctx.send(&user, UserEvent::ShowStats).await;
    assert_matches!(&replies[..], [Reply::Text { keyboard: Keyboard::MainMenu, .. }]);
}

#[tokio::test]
async fn test_store_outage_becomes_generic_message() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::Start).await;
    ctx.pool.set_unavailable(true);

    let replies = ctx.send(&user, UserEvent::StartQuiz).await;

    assert_matches!(&replies[..], [Reply::Text { text, keyboard: Keyboard::MainMenu }] if *text == ctx.t("errors.generic"));

    ctx.pool.set_unavailable(false);
    let replies = ctx.send(&user, UserEvent::StartQuiz).await;
    assert!(has_question(&replies));
}

#[tokio::test]
async fn test_text_outside_dialogue_points_to_menu() {
    let ctx = TestContext::new().await;
    let user = test_user();

    let replies = ctx.text(&user, "привет").await;

    assert_eq!(texts(&replies), vec![ctx.t("messages.use_menu")]);
}

#[tokio::test(start_paused = true)]
async fn test_answer_after_expiry_is_stale() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;
    let question = ctx.current_question(&user);
    let correct = question
        .options
        .iter()
        .find(|o| o.text == question.correct_answer)
        .unwrap()
        .render_id
        .clone();

    tokio::time::sleep(Duration::from_secs(901)).await;
    let replies = ctx.send(&user, UserEvent::Answer { render_id: correct }).await;

    assert_eq!(texts(&replies), vec![ctx.t("errors.stale_session")]);
    assert!(ctx.pool.progress_of(user.id).is_empty());
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stale_add_another_button_ends_quiz() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    let replies = ctx.send(&user, UserEvent::AddAnother).await;

    assert!(!ctx.sessions().is_active(user.id));
    assert_eq!(ctx.flow().current_state(user.id).await.unwrap(), ConversationState::AwaitingWord);
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap().len(), 1);
    assert_eq!(texts(&replies).last(), Some(&ctx.t("add.prompt")));
}

#[tokio::test]
async fn test_stale_delete_another_button_ends_quiz() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    let replies = ctx.send(&user, UserEvent::DeleteAnother).await;

    assert!(!ctx.sessions().is_active(user.id));
    assert_eq!(
        ctx.flow().current_state(user.id).await.unwrap(),
        ConversationState::AwaitingDeleteTarget
    );
    assert_eq!(ctx.pool.list_session_records(user.id).await.unwrap().len(), 1);
    assert_eq!(texts(&replies).last(), Some(&ctx.t("delete.prompt")));
}

#[tokio::test]
async fn test_delete_another_continues_delete_dialogue() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::DeleteWord).await;
    ctx.text(&user, "яблоко").await;

    let replies = ctx.send(&user, UserEvent::DeleteAnother).await;

    assert_eq!(texts(&replies), vec![ctx.t("delete.prompt")]);
    assert!(ctx.pool.list_session_records(user.id).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_text_during_quiz_keeps_session_alive() {
    let ctx = TestContext::new().await;
    let user = test_user();
    ctx.send(&user, UserEvent::StartQuiz).await;

    tokio::time::sleep(Duration::from_secs(600)).await;
    let replies = ctx.text(&user, "привет").await;
    assert_eq!(texts(&replies), vec![ctx.t("messages.use_menu")]);
    tokio::time::sleep(Duration::from_secs(600)).await;

    assert!(ctx.sessions().is_active(user.id));
    assert!(ctx.notifier.notices().is_empty());
    assert_eq!(ctx.sessions().pending_timers(), 1);
}
