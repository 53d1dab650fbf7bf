//! Visitor session state seam

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use adplace_core::SessionFrequencyState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Result;

/// Small per-visitor map persisted between page loads
pub trait SessionStore: Send + Sync {
    /// Current state, empty if none or expired
    fn read(&self, visitor_key: &str) -> Result<SessionFrequencyState>;

    /// Replace the stored state, expiring after `ttl`
    fn write(&self, visitor_key: &str, state: &SessionFrequencyState, ttl: Duration) -> Result<()>;
}

/// Stable, opaque visitor key derived from address and user agent
pub fn visitor_key(ip: IpAddr, user_agent: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(ip.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(user_agent.as_bytes());
    hasher.finalize().to_hex()[..32].to_string()
}

/// In-process store with TTL
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    /// Visitor key -> (state, expiry); `None` never expires
    entries: DashMap<String, (SessionFrequencyState, Option<Instant>)>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, visitor_key: &str) -> Result<SessionFrequencyState> {
        let now = Instant::now();
        // Drops the entry if it has expired, otherwise keeps it
        let expired = self
            .entries
            .remove_if(visitor_key, |_, (_, expires_at)| expires_at.is_some_and(|at| now >= at));
        if expired.is_some() {
            return Ok(SessionFrequencyState::new());
        }

        Ok(self
            .entries
            .get(visitor_key)
            .map(|entry| entry.0.clone())
            .unwrap_or_default())
    }

    fn write(&self, visitor_key: &str, state: &SessionFrequencyState, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(visitor_key.to_string(), (state.clone(), expires_at));
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    /// Unix seconds
    expires_at: i64,
    /// Decoded leniently so one bad count does not fail the read
    #[serde(default)]
    counts: serde_json::Value,
}

/// One JSON file per visitor under a root directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store under the platform data directory
    pub fn default_location() -> Result<Self> {
        let root = match directories::ProjectDirs::from("com", "adplace", "adplace") {
            Some(dirs) => dirs.data_dir().join("sessions"),
            None => PathBuf::from(".adplace/sessions"),
        };
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, visitor_key: &str) -> PathBuf {
        // Keys are hashed so arbitrary host keys are safe file names
        let name = blake3::hash(visitor_key.as_bytes()).to_hex();
        self.root.join(format!("{}.json", &name[..32]))
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self, visitor_key: &str) -> Result<SessionFrequencyState> {
        let path = self.path_for(visitor_key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionFrequencyState::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: SessionFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt session file, starting empty");
                return Ok(SessionFrequencyState::new());
            }
        };

        if OffsetDateTime::now_utc().unix_timestamp() >= file.expires_at {
            return Ok(SessionFrequencyState::new());
        }
        Ok(SessionFrequencyState::decode(&file.counts.to_string()))
    }

    fn write(&self, visitor_key: &str, state: &SessionFrequencyState, ttl: Duration) -> Result<()> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let file = SessionFile {
            expires_at: OffsetDateTime::now_utc()
                .unix_timestamp()
                .saturating_add(ttl_secs),
            counts: serde_json::to_value(state)?,
        };
        std::fs::write(self.path_for(visitor_key), serde_json::to_string(&file)?)?;
        Ok(())
    }
}
