//! Mock Telegram API Server for testing
//!
//! This module provides a mock HTTP server that simulates the Telegram Bot API
//! for testing purposes. It uses wiremock to create configurable mock responses.

use serde_json::{json, Value};
use teloxide::types::{CallbackQuery, Message};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

use super::test_context::test_bot_token;

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Bot pointed at this server
    pub fn bot(&self) -> teloxide::Bot {
        let url = self.server.uri().parse().expect("Invalid mock server url");
        teloxide::Bot::new(test_bot_token()).set_api_url(url)
    }

    /// Mount a successful response for a Bot API method, named as teloxide sends it (`SendMessage`)
    async fn mock_method(&self, name: &str, result: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/{}", test_bot_token(), name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result })))
            .mount(&self.server)
            .await;
    }

    /// Setup all methods the bot calls with default success responses
    pub async fn setup_default_mocks(&self, chat_id: i64) {
        self.mock_method("SendMessage", sent_message(chat_id)).await;
        self.mock_method("EditMessageReplyMarkup", sent_message(chat_id)).await;
        self.mock_method("AnswerCallbackQuery", json!(true)).await;

        let mut voice = sent_message(chat_id);
        voice["voice"] = json!({
            "file_id": "voice-file",
            "file_unique_id": "voice-unique",
            "duration": 1
        });
        if let Some(fields) = voice.as_object_mut() {
            fields.remove("text");
        }
        self.mock_method("SendVoice", voice).await;
    }

    /// Requests made to a Bot API method; method names match case-insensitively
    async fn requests_to(&self, endpoint: &str) -> Vec<Request> {
        let received_requests = self.server.received_requests().await.unwrap_or_default();
        received_requests
            .into_iter()
            .filter(|req| {
                req.url
                    .path()
                    .rsplit('/')
                    .next()
                    .map_or(false, |name| name.eq_ignore_ascii_case(endpoint))
            })
            .collect()
    }

    /// Number of calls made to a Bot API method
    pub async fn calls(&self, endpoint: &str) -> usize {
        self.requests_to(endpoint).await.len()
    }

    /// Bodies of the calls made to a Bot API method
    pub async fn bodies(&self, endpoint: &str) -> Vec<Value> {
        self.requests_to(endpoint)
            .await
            .iter()
            .filter_map(|req| serde_json::from_slice(&req.body).ok())
            .collect()
    }
}

fn sent_message(chat_id: i64) -> Value {
    json!({
        "message_id": 123,
        "from": {
            "id": 12345,
            "is_bot": true,
            "first_name": "WordBuddy",
            "username": "wordbuddy_bot"
        },
        "chat": {
            "id": chat_id,
            "type": "private",
            "first_name": "Anna"
        },
        "date": 1640995200,
        "text": "Test message"
    })
}

/// Incoming private text message from a user
pub fn incoming_text(user_id: i64, text: &str) -> Message {
    serde_json::from_value(json!({
        "message_id": 1,
        "date": 1640995200,
        "chat": {
            "id": user_id,
            "type": "private",
            "first_name": "Anna"
        },
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Anna",
            "language_code": "ru"
        },
        "text": text
    }))
    .expect("Invalid test message")
}

/// Button press on a bot message previously sent to the user
pub fn incoming_callback(user_id: i64, data: &str) -> CallbackQuery {
    serde_json::from_value(json!({
        "id": "callback-1",
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Anna",
            "language_code": "ru"
        },
        "chat_instance": "chat-instance-1",
        "data": data,
        "message": sent_message(user_id)
    }))
    .expect("Invalid test callback query")
}
