//! Networked cache store speaking the memcached text protocol.
//!
//! # Responsibilities
//! - Namespace every key under a fixed prefix
//! - Keep a small list of idle connections for reuse
//! - Bound every operation with a timeout
//!
//! # Design Decisions
//! - A connection is checked out of the idle list before any I/O, so no
//!   lock is held while waiting on the network
//! - A connection that saw an error or timeout is dropped, never reused
//! - Keys memcached would reject (too long, whitespace) are replaced by
//!   their SHA-256

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::cache::{CacheError, CacheStore};

pub const MAX_KEY_LEN: usize = 250;

/// memcached's default `-I` item size limit.
pub const DEFAULT_MAX_ITEM_SIZE: usize = 1024 * 1024;

/// Bytes `namespaced` adds around the prefix on the hashed path (`:h:` + 64 hex).
pub const HASHED_KEY_OVERHEAD: usize = 3 + 64;

type Connection = BufReader<TcpStream>;

/// Memcached-backed store.
#[derive(Debug)]
pub struct MemcachedStore {
    address: String,
    prefix: String,
    expiry_secs: u32,
    op_timeout: Duration,
    max_idle: usize,
    max_item_size: usize,
    idle: Mutex<Vec<Connection>>,
}

impl MemcachedStore {
    pub fn new(address: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            prefix: prefix.into(),
            expiry_secs: 0,
            op_timeout: Duration::from_millis(500),
            max_idle: 4,
            max_item_size: DEFAULT_MAX_ITEM_SIZE,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Expiry applied to every `set`. `0` means never expire.
    #[must_use]
    pub fn with_expiry(mut self, secs: u32) -> Self {
        self.expiry_secs = secs;
        self
    }

    #[must_use]
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Largest value accepted in a `VALUE` reply.
    #[must_use]
    pub fn with_max_item_size(mut self, max_item_size: usize) -> Self {
        self.max_item_size = max_item_size;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Full key as sent to memcached.
    pub fn namespaced(&self, key: &str) -> String {
        let full = format!("{}:{}", self.prefix, key);
        let valid = full.len() <= MAX_KEY_LEN
            && full.bytes().all(|b| b.is_ascii_graphic());
        if valid {
            full
        } else {
            format!("{}:h:{}", self.prefix, hex::encode(Sha256::digest(key.as_bytes())))
        }
    }

    async fn checkout(&self) -> Result<Connection, CacheError> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match reused {
            Some(conn) => Ok(conn),
            None => {
                let stream = TcpStream::connect(&self.address).await?;
                stream.set_nodelay(true)?;
                tracing::debug!(address = %self.address, "Opened memcached connection");
                Ok(BufReader::new(stream))
            }
        }
    }

    fn checkin(&self, conn: Connection) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }

    async fn with_connection<T, F>(&self, op: &'static str, f: F) -> Result<T, CacheError>
    where
        F: for<'c> FnOnce(
            &'c mut Connection,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<T, CacheError>> + Send + 'c>,
        >,
    {
        let millis = u64::try_from(self.op_timeout.as_millis()).unwrap_or(u64::MAX);
        let outcome = timeout(self.op_timeout, async {
            let mut conn = self.checkout().await?;
            let result = f(&mut conn).await;
            Ok::<_, CacheError>((conn, result))
        })
        .await;

        match outcome {
            Ok(Ok((conn, Ok(value)))) => {
                self.checkin(conn);
                Ok(value)
            }
            Ok(Ok((_, Err(e)))) | Ok(Err(e)) => {
                tracing::warn!(op, address = %self.address, error = %e, "Memcached operation failed");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(op, address = %self.address, millis, "Memcached operation timed out");
                Err(CacheError::Timeout(millis))
            }
        }
    }
}

async fn read_line(conn: &mut Connection) -> Result<String, CacheError> {
    let mut line = String::new();
    let n = conn.read_line(&mut line).await?;
    if n == 0 {
        return Err(CacheError::Protocol("connection closed".into()));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn get_op(
    conn: &mut Connection,
    key: String,
    max_item_size: usize,
) -> Result<Option<Vec<u8>>, CacheError> {
    conn.get_mut()
        .write_all(format!("get {key}\r\n").as_bytes())
        .await?;

    let header = read_line(conn).await?;
    if header == "END" {
        return Ok(None);
    }

    // VALUE <key> <flags> <bytes>
    let mut parts = header.split_ascii_whitespace();
    let len = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("VALUE"), Some(_), Some(_), Some(len)) => len
            .parse::<usize>()
            .map_err(|_| CacheError::Protocol(header.clone()))?,
        _ => return Err(CacheError::Protocol(header)),
    };

    if len > max_item_size {
        return Err(CacheError::Protocol(format!(
            "value of {len} bytes exceeds the {max_item_size} byte limit"
        )));
    }
    let framed = len
        .checked_add(2)
        .ok_or_else(|| CacheError::Protocol(header.clone()))?;
    let mut data = vec![0u8; framed];
    conn.read_exact(&mut data).await?;
    data.truncate(len);

    let trailer = read_line(conn).await?;
    if trailer != "END" {
        return Err(CacheError::Protocol(trailer));
    }
    Ok(Some(data))
}

async fn set_op(
    conn: &mut Connection,
    key: String,
    value: Vec<u8>,
    expiry: u32,
) -> Result<(), CacheError> {
    let mut frame = format!("set {key} 0 {expiry} {}\r\n", value.len()).into_bytes();
    frame.extend_from_slice(&value);
    frame.extend_from_slice(b"\r\n");
    conn.get_mut().write_all(&frame).await?;

    let reply = read_line(conn).await?;
    if reply == "STORED" {
        Ok(())
    } else {
        Err(CacheError::Protocol(reply))
    }
}

#[async_trait]
impl CacheStore for MemcachedStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let full = self.namespaced(key);
        tracing::debug!(key = %full, "Memcached get");
        let max_item_size = self.max_item_size;
        self.with_connection("get", move |conn| Box::pin(get_op(conn, full, max_item_size)))
            .await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let full = self.namespaced(key);
        let expiry = self.expiry_secs;
        tracing::debug!(key = %full, bytes = value.len(), "Memcached set");
        self.with_connection("set", move |conn| Box::pin(set_op(conn, full, value, expiry)))
            .await
    }
}
