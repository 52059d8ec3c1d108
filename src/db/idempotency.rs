// db/idempotency.rs
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Add-if-absent keyed store guarding against duplicate POST submissions.
///
/// Backed by Redis (`SET NX EX`) when a connection is available so the
/// guard holds across processes; otherwise falls back to an in-process
/// TTL map. Redis failures fail open: a broken cache must not reject
/// legitimate requests.
pub struct IdempotencyStore {
    redis_client: Option<Arc<ConnectionManager>>,
    local: Mutex<HashMap<String, Instant>>,
}

impl std::fmt::Debug for IdempotencyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyStore")
            .field("redis", &self.redis_client.is_some())
            .finish()
    }
}

impl IdempotencyStore {
    pub fn new(redis_client: Option<Arc<ConnectionManager>>) -> Self {
        IdempotencyStore {
            redis_client,
            local: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true when the key was newly set, false when it already
    /// exists within its TTL.
    pub async fn add(&self, key: &str, ttl: Duration) -> bool {
        if let Some(ref redis_arc) = self.redis_client {
            let mut conn = ConnectionManager::clone(redis_arc);
            let result: Result<Option<String>, redis::RedisError> = redis::cmd("SET")
                .arg(key)
                .arg(1)
                .arg("NX")
                .arg("EX")
                .arg(ttl.as_secs())
                .query_async(&mut conn)
                .await;

            match result {
                Ok(reply) => return reply.is_some(),
                Err(e) => {
                    tracing::warn!("Idempotency check failed on Redis: {}. Allowing request.", e);
                    return true;
                }
            }
        }

        self.add_local(key, ttl, Instant::now())
    }

    fn add_local(&self, key: &str, ttl: Duration, now: Instant) -> bool {
        let mut entries = self.local.lock().unwrap_or_else(|e| e.into_inner());

        entries.retain(|_, expires_at| *expires_at > now);

        if entries.contains_key(key) {
            return false;
        }

        entries.insert(key.to_string(), now + ttl);
        true
    }
}

pub fn idempotency_key(user_id: uuid::Uuid, header_value: &str) -> String {
    format!("idemp-{}-{}", user_id, header_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_add_succeeds_second_is_rejected() {
        let store = IdempotencyStore::new(None);

        assert!(store.add("idemp-u1-k1", Duration::from_secs(60)).await);
        assert!(!store.add("idemp-u1-k1", Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let store = IdempotencyStore::new(None);

        assert!(store.add("idemp-u1-k1", Duration::from_secs(60)).await);
        assert!(store.add("idemp-u1-k2", Duration::from_secs(60)).await);
        assert!(store.add("idemp-u2-k1", Duration::from_secs(60)).await);
    }

    #[test]
    fn expired_entries_are_purged() {
        let store = IdempotencyStore::new(None);
        let start = Instant::now();

        assert!(store.add_local("key", Duration::from_secs(10), start));
        assert!(!store.add_local("key", Duration::from_secs(10), start + Duration::from_secs(5)));
        assert!(store.add_local("key", Duration::from_secs(10), start + Duration::from_secs(11)));
    }

    #[test]
    fn key_format_includes_user_and_header() {
        let user_id = uuid::Uuid::new_v4();
        let key = idempotency_key(user_id, "client-key");
        assert_eq!(key, format!("idemp-{}-client-key", user_id));
    }
}
