//! Redis-protocol store
//!
//! Uses a single multiplexed connection shared by every caller. The
//! connection is opened eagerly by [`KvStore::connect`] or lazily on first
//! use, and is discarded after any connection-class failure so the next
//! call dials again. Each dialled connection carries a generation number;
//! a failure only discards the connection it happened on, never a newer one
//! another caller has already dialled.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::options::StoreOptions;
use crate::store::KvStore;

/// A dialled connection and the generation it was opened in
type Slot = (u64, MultiplexedConnection);

/// Store client speaking the Redis protocol
pub struct RedisStore {
    options: StoreOptions,
    client: redis::Client,
    connection: Mutex<Option<Slot>>,
    generation: AtomicU64,
}

impl RedisStore {
    /// Create a store client without touching the network
    ///
    /// # Arguments
    /// * `options` - Host, port, database and timeouts
    pub fn new(options: StoreOptions) -> Result<Self> {
        let client = redis::Client::open(options.url().as_str())
            .map_err(|e| StoreError::InvalidOptions(e.to_string()))?;

        Ok(Self {
            options,
            client,
            connection: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    /// Options this client was built with
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns the shared connection, dialing if none is open
    async fn connection(&self) -> Result<Slot> {
        if let Some(slot) = self.connection.lock().await.as_ref() {
            return Ok(slot.clone());
        }

        debug!(addr = %self.options.addr(), "Opening store connection");

        let conn = tokio::time::timeout(
            self.options.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            StoreError::connection(
                self.options.addr(),
                format!(
                    "connect timed out after {} ms",
                    self.options.connect_timeout.as_millis()
                ),
            )
        })?
        .map_err(|e| self.classify(e))?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let slot = (generation, conn);
        *self.connection.lock().await = Some(slot.clone());

        Ok(slot)
    }

    /// Discards the cached connection if it is still the given generation
    async fn invalidate(&self, generation: u64) {
        let mut cached = self.connection.lock().await;
        if matches!(cached.as_ref(), Some((current, _)) if *current == generation) {
            cached.take();
        }
    }

    /// Runs one command with the response timeout applied
    async fn execute<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let (generation, conn) = self.connection().await?;

        let outcome = match tokio::time::timeout(self.options.response_timeout, op(conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.classify(e)),
            Err(_) => Err(StoreError::connection(
                self.options.addr(),
                format!(
                    "no response after {} ms",
                    self.options.response_timeout.as_millis()
                ),
            )),
        };

        if let Err(e) = &outcome {
            if e.is_connection() {
                warn!(addr = %self.options.addr(), error = %e, "Dropping store connection");
                self.invalidate(generation).await;
            }
        }

        outcome
    }

    /// Maps a driver error onto the store error taxonomy
    fn classify(&self, err: redis::RedisError) -> StoreError {
        if err.is_io_error()
            || err.is_timeout()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
        {
            StoreError::connection(self.options.addr(), err.to_string())
        } else {
            StoreError::Unexpected(err.to_string())
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn connect(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    async fn get(&self, key: &str) -> Result<String> {
        let value = self
            .execute(|mut conn| async move { conn.get::<_, Option<String>>(key).await })
            .await?;

        value.ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.execute(|mut conn| async move { conn.set::<_, _, ()>(key, value).await })
            .await
    }

    async fn ping(&self) -> Result<()> {
        let pong = self
            .execute(|mut conn| async move {
                let reply: redis::RedisResult<String> =
                    redis::cmd("PING").query_async(&mut conn).await;
                reply
            })
            .await?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Unexpected(format!("unexpected PING reply: {}", pong)))
        }
    }

    fn address(&self) -> String {
        self.options.addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    /// Port on localhost that nothing is listening on
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    fn unreachable_store() -> RedisStore {
        let options = StoreOptions::new("127.0.0.1", closed_port())
            .with_connect_timeout(Duration::from_millis(500))
            .with_response_timeout(Duration::from_millis(500));
        RedisStore::new(options).unwrap()
    }

    #[test]
    fn test_new_does_not_dial() {
        let store = unreachable_store();
        assert_eq!(store.address(), format!("127.0.0.1:{}", store.options().port));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_connection_error() {
        let store = unreachable_store();
        let err = store.connect().await.unwrap_err();
        assert!(err.is_connection(), "expected connection error, got {err:?}");
    }

    #[tokio::test]
    async fn test_get_against_closed_port_is_connection_error() {
        let store = unreachable_store();
        let err = store.get("first-name").await.unwrap_err();
        assert!(err.is_connection(), "expected connection error, got {err:?}");

        // A second call dials again instead of reusing a dead connection
        let err = store.set("first-name", "Beyond").await.unwrap_err();
        assert!(err.is_connection(), "expected connection error, got {err:?}");
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        // Accepts TCP but never speaks the protocol
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let options = StoreOptions::new("127.0.0.1", port)
            .with_connect_timeout(Duration::from_millis(200))
            .with_response_timeout(Duration::from_millis(200));
        let store = RedisStore::new(options).unwrap();

        let err = store.get("environment").await.unwrap_err();
        assert!(err.is_connection(), "expected connection error, got {err:?}");
    }

    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;

    type Data = Arc<StdMutex<HashMap<String, String>>>;

    /// In-process server answering GET, SET and PING over the wire protocol
    struct FakeServer {
        port: u16,
        accepted: Arc<AtomicUsize>,
        sessions: Arc<StdMutex<Vec<JoinHandle<()>>>>,
    }

    impl FakeServer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let accepted = Arc::new(AtomicUsize::new(0));
            let sessions = Arc::new(StdMutex::new(Vec::new()));
            let data: Data = Arc::default();

            {
                let (accepted, sessions) = (accepted.clone(), sessions.clone());
                tokio::spawn(async move {
                    while let Ok((socket, _)) = listener.accept().await {
                        accepted.fetch_add(1, Ordering::SeqCst);
                        let session = tokio::spawn(serve(socket, data.clone()));
                        sessions.lock().unwrap().push(session);
                    }
                });
            }

            Self {
                port,
                accepted,
                sessions,
            }
        }

        fn store(&self) -> RedisStore {
            let options = StoreOptions::new("127.0.0.1", self.port)
                .with_connect_timeout(Duration::from_millis(500))
                .with_response_timeout(Duration::from_millis(500));
            RedisStore::new(options).unwrap()
        }

        /// Connections accepted so far
        fn accepted(&self) -> usize {
            self.accepted.load(Ordering::SeqCst)
        }

        /// Close every client connection; the listener keeps accepting
        fn drop_sessions(&self) {
            for session in self.sessions.lock().unwrap().drain(..) {
                session.abort();
            }
        }
    }

    async fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
            let mut buf = vec![0; len + 2];
            reader.read_exact(&mut buf).await.ok()?;
            buf.truncate(len);
            args.push(String::from_utf8(buf).ok()?);
        }

        Some(args)
    }

    fn respond(args: &[String], data: &Data) -> String {
        let name = args.first().map(|a| a.to_ascii_uppercase()).unwrap_or_default();

        match (name.as_str(), args.get(1)) {
            ("PING", _) => "+PONG\r\n".to_string(),
            ("GET", Some(key)) if key == "corrupt" => {
                "-WRONGTYPE Operation against a key holding the wrong kind of value\r\n"
                    .to_string()
            }
            ("GET", Some(key)) => match data.lock().unwrap().get(key) {
                Some(value) => format!("${}\r\n{}\r\n", value.len(), value),
                None => "$-1\r\n".to_string(),
            },
            ("SET", Some(key)) => {
                let value = args.get(2).cloned().unwrap_or_default();
                data.lock().unwrap().insert(key.clone(), value);
                "+OK\r\n".to_string()
            }
            // Connection setup commands
            _ => "+OK\r\n".to_string(),
        }
    }

    async fn serve(socket: TcpStream, data: Data) {
        let mut reader = BufReader::new(socket);
        while let Some(args) = read_command(&mut reader).await {
            let reply = respond(&args, &data);
            if reader.get_mut().write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip_against_server() {
        let server = FakeServer::start().await;
        let store = server.store();

        store.connect().await.unwrap();
        store.ping().await.unwrap();

        let err = store.get("environment").await.unwrap_err();
        assert!(err.is_not_found(), "expected not found, got {err:?}");

        store.set("first-name", "Beyond").await.unwrap();
        store.set("first-name", "Defeated").await.unwrap();
        assert_eq!(store.get("first-name").await.unwrap(), "Defeated");

        let err = store.get("corrupt").await.unwrap_err();
        assert!(matches!(err, StoreError::Unexpected(_)), "got {err:?}");

        // Every command went over the one shared connection
        assert_eq!(server.accepted(), 1);
    }

    #[tokio::test]
    async fn test_redials_after_server_drops_connection() {
        let server = FakeServer::start().await;
        let store = server.store();

        store.set("first-name", "Beyond").await.unwrap();
        assert_eq!(server.accepted(), 1);

        server.drop_sessions();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = store.get("first-name").await.unwrap_err();
        assert!(err.is_connection(), "expected connection error, got {err:?}");

        assert_eq!(store.get("first-name").await.unwrap(), "Beyond");
        assert_eq!(server.accepted(), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_keeps_newer_connection() {
        let server = FakeServer::start().await;
        let store = server.store();

        store.connect().await.unwrap();

        // A failure seen on an older generation leaves the live connection alone
        store.invalidate(0).await;
        store.ping().await.unwrap();
        assert_eq!(server.accepted(), 1);

        store.invalidate(1).await;
        store.ping().await.unwrap();
        assert_eq!(server.accepted(), 2);
    }
}
