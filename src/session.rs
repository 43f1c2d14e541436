//! Session gate and token persistence
//!
//! The gate accepts any non-empty username/password pair, hands out a demo
//! token and remembers it in a [`TokenStore`] under the fixed key
//! [`TOKEN_KEY`], so the next start-up can skip the login step. The chat side
//! only ever asks whether someone is logged in.

use crate::config::{SessionBackend, SessionConfig};
use crate::error::{Result, ShambaError};
use directories::ProjectDirs;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storage key for the session token
pub const TOKEN_KEY: &str = "authToken";

/// Token issued by the demo login
pub const DEMO_TOKEN: &str = "demo-token";

/// Keyring service name
const KEYRING_SERVICE: &str = "shamba";

/// Durable key-value storage for session data
pub trait TokenStore: Send + Sync {
    /// Read a value
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| ShambaError::Session("token store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ShambaError::Session("token store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ShambaError::Session("token store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// JSON object on disk, one entry per key
///
/// # Examples
///
/// ```
/// use shamba::session::{FileTokenStore, TokenStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileTokenStore::new(dir.path().join("session.json"));
/// store.save("authToken", "demo-token").unwrap();
/// assert_eq!(store.load("authToken").unwrap(), Some("demo-token".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data dir>/session.json`
    ///
    /// # Errors
    ///
    /// Returns error if the platform data directory cannot be determined
    pub fn in_data_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("org", "shamba", "shamba")
            .ok_or_else(|| ShambaError::Session("Could not determine data directory".into()))?;
        Ok(Self::new(dirs.data_dir().join("session.json")))
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            ShambaError::Session(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
            .into()
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(values)?)?;

        // Owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// OS native credential store (Keychain, Secret Service, Credential Manager)
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringTokenStore;

impl TokenStore for KeyringTokenStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ShambaError::Keyring(e).into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, key)?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ShambaError::Keyring(e).into()),
        }
    }
}

/// Build the store selected in the configuration
///
/// # Errors
///
/// Returns error if the file backend has no usable location
pub fn create_store(config: &SessionConfig) -> Result<Arc<dyn TokenStore>> {
    Ok(match config.backend {
        SessionBackend::File => match &config.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(FileTokenStore::in_data_dir()?),
        },
        SessionBackend::Keyring => Arc::new(KeyringTokenStore),
        SessionBackend::Memory => Arc::new(MemoryTokenStore::new()),
    })
}

/// Login state for one run of the client
pub struct SessionGate {
    store: Arc<dyn TokenStore>,
    token: Option<String>,
    login_delay: Duration,
}

impl SessionGate {
    /// Create a logged-out gate backed by `store`
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            token: None,
            login_delay: Duration::ZERO,
        }
    }

    /// Build a gate from configuration and restore any saved session
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be created or read
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let mut gate = Self::new(create_store(config)?)
            .with_login_delay(Duration::from_millis(config.login_delay_ms));
        gate.restore()?;
        Ok(gate)
    }

    /// Simulate server latency on login
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Pick up a token saved by an earlier run
    ///
    /// # Returns
    ///
    /// Returns whether a session was restored
    pub fn restore(&mut self) -> Result<bool> {
        self.token = self.store.load(TOKEN_KEY)?.filter(|t| !t.is_empty());
        if self.token.is_some() {
            tracing::debug!("Restored saved session");
        }
        Ok(self.token.is_some())
    }

    /// Log in
    ///
    /// Any non-blank username and password are accepted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` if either field is blank, or a storage
    /// error if the token cannot be saved
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ShambaError::InvalidCredentials("Please fill in all fields".to_string()).into());
        }

        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }

        self.store.save(TOKEN_KEY, DEMO_TOKEN)?;
        self.token = Some(DEMO_TOKEN.to_string());
        tracing::info!("Logged in as {}", username.trim());
        Ok(DEMO_TOKEN.to_string())
    }

    /// Log out and forget the saved token
    ///
    /// # Errors
    ///
    /// Returns error if the token cannot be removed from storage
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.store.remove(TOKEN_KEY)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Whether a session is active
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Fail with `NotLoggedIn` unless a session is active
    pub fn require_login(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(ShambaError::NotLoggedIn.into())
        }
    }
}
