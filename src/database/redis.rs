use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::env;

/// Redis connection wrapper
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    /// Initialize Redis connection from environment variable
    pub async fn init() -> Result<Self, String> {
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let client =
            Client::open(redis_url).map_err(|e| format!("Failed to create Redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))?;

        log::info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Redis-backed session store. One key per user, holding the token the
/// user last logged in with.
#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub fn new(client: &RedisClient) -> Self {
        Self {
            connection: client.get_connection(),
        }
    }

    fn session_key(user_id: &str) -> String {
        format!("session:{}", user_id)
    }

    /// Store a session token with an expiry in seconds
    pub async fn store_session(
        &self,
        user_id: &str,
        token: &str,
        expiry_seconds: u64,
    ) -> Result<(), String> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(Self::session_key(user_id), token, expiry_seconds)
            .await
            .map_err(|e| format!("Failed to store session: {}", e))
    }

    /// Check whether the given token is the user's current session token.
    /// `Ok(None)` means no session exists or the token does not match.
    pub async fn validate_session(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Option<String>, String> {
        let mut conn = self.connection.clone();
        let stored: Option<String> = conn
            .get(Self::session_key(user_id))
            .await
            .map_err(|e| format!("Failed to read session: {}", e))?;

        match stored {
            Some(stored_token) if stored_token == token => Ok(Some(user_id.to_string())),
            _ => Ok(None),
        }
    }

    /// Remove the user's session (logout)
    pub async fn invalidate_session(&self, user_id: &str) -> Result<(), String> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(Self::session_key(user_id))
            .await
            .map_err(|e| format!("Failed to delete session: {}", e))
    }
}
