//! Quiz engine
//!
//! Picks the next unseen word, assembles distractors and evaluates answers.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::WordPoolStore;
use crate::models::WordRef;
use crate::utils::errors::{Result, WordBuddyError};
use crate::utils::helpers::{normalize_term, same_term};

/// One selectable answer as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Identifier attached to the button, regenerated on every build
    pub render_id: String,
    pub text: String,
}

/// Snapshot of the question currently shown to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub word: WordRef,
    /// Term in the language being learned, shown in the prompt
    pub prompt_term: String,
    /// Expected answer in the learner's language
    pub correct_answer: String,
    pub distractors: Vec<String>,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Option text for a button identifier of the current build
    pub fn option_text(&self, render_id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.render_id == render_id)
            .map(|o| o.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// `newly_learned` is false when the word already had a progress record
    Correct { newly_learned: bool },
    /// Same question with freshly built options
    Incorrect { options: Vec<AnswerOption> },
}

pub struct QuizEngine {
    store: Arc<dyn WordPoolStore>,
    distractor_count: usize,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn WordPoolStore>, distractor_count: usize) -> Self {
        Self { store, distractor_count }
    }

    /// Next question for the user, `None` when every word in the pool has been learned
    pub async fn next_question(&self, user_id: i64) -> Result<Option<Question>> {
        let word = match self.store.get_unseen_word(user_id).await? {
            Some(word) => word,
            None => {
                info!(user_id = user_id, "Word pool exhausted");
                return Ok(None);
            }
        };

        let correct_answer = normalize_term(&word.source_term);
        let distractors = self.distractors(&correct_answer, self.distractor_count).await?;
        let options = build_options(&correct_answer, &distractors);

        debug!(
            user_id = user_id,
            word_id = word.id,
            kind = %word.kind,
            distractors = distractors.len(),
            "Built question"
        );

        Ok(Some(Question {
            word: word.word_ref(),
            prompt_term: word.target_term,
            correct_answer,
            distractors,
            options,
        }))
    }

    /// Up to `k` wrong answers drawn from the shared dictionary
    pub async fn distractors(&self, correct: &str, k: usize) -> Result<Vec<String>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.store.shared_translations_except(correct, k).await?;
        Ok(select_distractors(correct, candidates, k))
    }

    /// Check a submitted answer and record progress on success.
    ///
    /// Progress is stamped with `session_start` so that the session summary
    /// counts it regardless of how long the session has been running.
    pub async fn evaluate(
        &self,
        user_id: i64,
        question: &Question,
        session_start: DateTime<Utc>,
        submitted: &str,
    ) -> Result<Evaluation> {
        if same_term(submitted, &question.correct_answer) {
            let newly_learned = self
                .store
                .insert_progress_if_absent(user_id, question.word, session_start)
                .await?;
            debug!(user_id = user_id, word_id = question.word.id, newly_learned = newly_learned, "Correct answer");
            Ok(Evaluation::Correct { newly_learned })
        } else {
            debug!(user_id = user_id, word_id = question.word.id, "Incorrect answer");
            Ok(Evaluation::Incorrect {
                options: build_options(&question.correct_answer, &question.distractors),
            })
        }
    }

    /// Resolve an inline-button identifier against the question on screen
    pub fn answer_by_render_id<'q>(
        &self,
        user_id: i64,
        question: Option<&'q Question>,
        render_id: &str,
    ) -> Result<&'q str> {
        question
            .and_then(|q| q.option_text(render_id))
            .ok_or(WordBuddyError::StaleSession { user_id })
    }
}

/// Filter out the correct answer and duplicates, keeping at most `k` entries
pub fn select_distractors(correct: &str, candidates: Vec<String>, k: usize) -> Vec<String> {
    let mut selected: Vec<String> = Vec::with_capacity(k);
    for candidate in candidates {
        if selected.len() >= k {
            break;
        }
        let candidate = normalize_term(&candidate);
        if candidate.is_empty() || same_term(&candidate, correct) || selected.contains(&candidate) {
            continue;
        }
        selected.push(candidate);
    }
    selected
}

/// Shuffle the correct answer among the distractors, each option with a new render id
pub fn build_options(correct: &str, distractors: &[String]) -> Vec<AnswerOption> {
    let mut texts: Vec<&str> = Vec::with_capacity(distractors.len() + 1);
    texts.push(correct);
    texts.extend(distractors.iter().map(String::as_str));
    texts.shuffle(&mut rand::thread_rng());

    texts
        .into_iter()
        .map(|text| AnswerOption {
            render_id: Uuid::new_v4().simple().to_string(),
            text: text.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryWordPool;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn engine_with(pool: Arc<MemoryWordPool>) -> QuizEngine {
        QuizEngine::new(pool, 3)
    }

    #[tokio::test]
    async fn test_next_question_offers_correct_answer_once() {
        let pool = Arc::new(MemoryWordPool::with_shared_words(&[
            ("cat", "кот"),
            ("dog", "собака"),
            ("house", "дом"),
            ("sun", "солнце"),
        ]));
        let engine = engine_with(pool);

        let question = engine.next_question(1).await.unwrap().unwrap();
        let hits = question.options.iter().filter(|o| o.text == question.correct_answer).count();
        assert_eq!(hits, 1);
        assert_eq!(question.options.len(), 4);
        assert!(!question.distractors.contains(&question.correct_answer));
    }

    #[tokio::test]
    async fn test_small_pool_yields_fewer_distractors() {
        let pool = Arc::new(MemoryWordPool::with_shared_words(&[("cat", "кот"), ("dog", "собака")]));
        let engine = engine_with(pool);

        let distractors = engine.distractors("кот", 3).await.unwrap();
        assert_eq!(distractors, vec!["собака".to_string()]);
    }

    #[test]
    fn test_zero_distractors_requested() {
        assert!(select_distractors("а", vec!["Б".to_string(), "в".to_string()], 0).is_empty());
        assert_eq!(
            select_distractors("кот", vec!["КОТ".to_string(), "дом".to_string(), "Дом".to_string()], 2),
            vec!["дом".to_string()]
        );
    }

    #[tokio::test]
    async fn test_correct_answer_stamps_session_start() {
        let pool = Arc::new(MemoryWordPool::with_shared_words(&[("cat", "кот"), ("dog", "собака")]));
        let engine = engine_with(pool.clone());
        let question = engine.next_question(5).await.unwrap().unwrap();
        let start = Utc::now() - chrono::Duration::minutes(10);

        let submitted = question.correct_answer.to_uppercase();
        let evaluation = engine.evaluate(5, &question, start, &submitted).await.unwrap();
        assert_eq!(evaluation, Evaluation::Correct { newly_learned: true });

        let progress = pool.progress_of(5);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].learned_at, start);
        assert_eq!(progress[0].word, question.word);
    }

    #[tokio::test]
    async fn test_incorrect_answer_regenerates_render_ids() {
        let pool = Arc::new(MemoryWordPool::with_shared_words(&[("cat", "кот"), ("dog", "собака")]));
        let engine = engine_with(pool.clone());
        let question = engine.next_question(5).await.unwrap().unwrap();

        let evaluation = engine.evaluate(5, &question, Utc::now(), "неверно").await.unwrap();
        let options = assert_matches!(evaluation, Evaluation::Incorrect { options } => options);

        let old: HashSet<_> = question.options.iter().map(|o| o.render_id.clone()).collect();
        assert!(options.iter().all(|o| !old.contains(&o.render_id)));
        assert!(pool.progress_of(5).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_render_id_is_stale() {
        let pool = Arc::new(MemoryWordPool::with_shared_words(&[("cat", "кот")]));
        let engine = engine_with(pool);
        let question = engine.next_question(5).await.unwrap().unwrap();

        let text = engine.answer_by_render_id(5, Some(&question), &question.options[0].render_id).unwrap();
        assert_eq!(text, question.options[0].text);

        assert_matches!(
            engine.answer_by_render_id(5, Some(&question), "gone"),
            Err(WordBuddyError::StaleSession { user_id: 5 })
        );
        assert_matches!(
            engine.answer_by_render_id(5, None, "gone"),
            Err(WordBuddyError::StaleSession { .. })
        );
    }

    proptest! {
        #[test]
        fn prop_distractors_exclude_correct_and_are_unique(
            correct in "[а-я]{1,6}",
            candidates in proptest::collection::vec("[а-яА-Я]{1,6}", 0..20),
            k in 0usize..6,
        ) {
            let selected = select_distractors(&correct, candidates, k);
            prop_assert!(selected.len() <= k);
            prop_assert!(selected.iter().all(|d| !same_term(d, &correct)));
            let unique: HashSet<_> = selected.iter().map(|d| normalize_term(d)).collect();
            prop_assert_eq!(unique.len(), selected.len());
        }

        #[test]
        fn prop_options_contain_correct_exactly_once(
            distractors in proptest::collection::hash_set("[a-z]{2,6}", 0..4),
        ) {
            let distractors: Vec<String> = distractors.into_iter().collect();
            let options = build_options("правильно", &distractors);
            prop_assert_eq!(options.len(), distractors.len() + 1);
            prop_assert_eq!(options.iter().filter(|o| o.text == "правильно").count(), 1);
            let ids: HashSet<_> = options.iter().map(|o| o.render_id.clone()).collect();
            prop_assert_eq!(ids.len(), options.len());
        }
    }
}
