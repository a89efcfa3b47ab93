//! State storage implementation
//!
//! This module handles persistence of conversation state, either in Redis
//! with per-key TTL or in process memory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json;
use tracing::{debug, warn, error};
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::context::ConversationContext;

/// Where conversation contexts live between updates
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load a live context; expired contexts are removed and reported as absent
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>>;

    async fn save_context(&self, context: &ConversationContext) -> Result<()>;

    async fn delete_context(&self, user_id: i64) -> Result<()>;
}

/// Redis-based state storage manager
#[derive(Clone)]
pub struct StateStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl StateStorage {
    /// Create a new state storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Get the Redis key for a user's context
    fn get_context_key(&self, user_id: i64) -> String {
        format!("{}context:{}", self.config.prefix, user_id)
    }
}

#[async_trait]
impl ConversationStore for StateStorage {
    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let key = self.get_context_key(context.user_id);
        debug!(user_id = context.user_id, key = %key, state = %context.state, "Saving context to Redis");

        let serialized = match serde_json::to_string(context) {
            Ok(data) => data,
            Err(e) => {
                error!(user_id = context.user_id, error = %e, "Failed to serialize context");
                return Err(e.into());
            }
        };

        let mut conn = self.connection_manager.clone();

        let ttl_seconds = if let Some(expires_at) = context.expires_at {
            let duration = expires_at - chrono::Utc::now();
            std::cmp::max(duration.num_seconds(), 1) as u64
        } else {
            self.config.ttl_seconds
        };

        match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            Ok(_) => {
                debug!(user_id = context.user_id, ttl_seconds = ttl_seconds, "Context saved to Redis");
                Ok(())
            },
            Err(e) => {
                error!(user_id = context.user_id, error = %e, "Failed to save context to Redis");
                Err(e.into())
            }
        }
    }

    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.get_context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = match conn.get::<&str, Option<String>>(&key).await {
            Ok(data) => data,
            Err(e) => {
                error!(user_id = user_id, error = %e, "Failed to get context from Redis");
                return Err(e.into());
            }
        };

        match serialized {
            Some(data) => {
                let context: ConversationContext = match serde_json::from_str(&data) {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        error!(user_id = user_id, error = %e, "Failed to deserialize context");
                        return Err(e.into());
                    }
                };

                if context.is_expired() {
                    warn!(user_id = user_id, expires_at = ?context.expires_at, "Context has expired, removing");
                    self.delete_context(user_id).await?;
                    return Ok(None);
                }

                debug!(user_id = user_id, state = %context.state, "Context loaded");
                Ok(Some(context))
            }
            None => {
                debug!(user_id = user_id, "No context found in Redis");
                Ok(None)
            }
        }
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        let key = self.get_context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;

        if deleted > 0 {
            debug!("Deleted context for user {}", user_id);
        }

        Ok(())
    }
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStorage")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Process-local context storage, used when Redis is not configured
#[derive(Debug, Default)]
pub struct MemoryStateStorage {
    contexts: Mutex<HashMap<i64, ConversationContext>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, ConversationContext>> {
        self.contexts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ConversationStore for MemoryStateStorage {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let mut contexts = self.lock();
        match contexts.get(&user_id) {
            Some(context) if context.is_expired() => {
                debug!(user_id = user_id, "Dropping expired context");
                contexts.remove(&user_id);
                Ok(None)
            }
            Some(context) => Ok(Some(context.clone())),
            None => Ok(None),
        }
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        self.lock().insert(context.user_id, context.clone());
        Ok(())
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        self.lock().remove(&user_id);
        Ok(())
    }
}
