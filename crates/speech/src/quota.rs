//! Quota ledger for the primary provider's character budget
//!
//! Tracks consumed characters against the finite shared budget and the
//! one-way exhaustion flag. State is persisted to a small JSON file
//! after every mutation with an atomic temp-file replace, so a crash
//! mid-batch loses at most the in-flight request's bookkeeping.
//! Persistence failures are logged and swallowed: re-spending a few
//! characters after a restart is accepted, aborting synthesis is not.
//!
//! `chars_used` is non-decreasing and `exhausted` is monotonic for the
//! process lifetime; an external period rollover resets the budget by
//! replacing the state file out-of-band.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Persisted quota record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct QuotaState {
    /// Characters consumed against the budget in this period
    #[serde(default)]
    chars_used: u64,
    /// Set once the provider reports the budget spent; never unset
    #[serde(default)]
    exhausted: bool,
}

/// Snapshot of the ledger for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Characters consumed so far
    pub consumed: u64,
    /// Characters remaining (zero when exhausted)
    pub remaining: u64,
    /// Whether the one-way exhaustion switch has tripped
    pub exhausted: bool,
}

/// Durable character-budget bookkeeping for the primary provider
///
/// The ledger is the single owner of quota state; all consume/exhaust
/// mutations serialize through its internal mutex.
#[derive(Debug)]
pub struct QuotaLedger {
    state: Mutex<QuotaState>,
    limit: u64,
    path: PathBuf,
}

impl QuotaLedger {
    /// Load the ledger from its state file, starting fresh when the
    /// file is missing or unreadable
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, limit: u64) -> Self {
        let path = path.into();
        let state = Self::read_state(&path).unwrap_or_default();

        debug!(
            chars_used = state.chars_used,
            exhausted = state.exhausted,
            "Quota ledger loaded"
        );

        Self {
            state: Mutex::new(state),
            limit,
            path,
        }
    }

    fn read_state(path: &Path) -> Option<QuotaState> {
        let raw = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt quota state, starting fresh");
                None
            },
        }
    }

    /// Whether the primary provider may serve a request of this size
    ///
    /// All-or-nothing: a request is never partially served from the
    /// remaining budget.
    #[must_use]
    pub fn can_consume(&self, characters: u64) -> bool {
        let state = self.state.lock();
        if state.exhausted {
            return false;
        }
        let remaining = self.limit.saturating_sub(state.chars_used);
        if remaining < characters {
            warn!(remaining, requested = characters, "Primary quota low");
            return false;
        }
        true
    }

    /// Record characters spent by a successful primary synthesis
    pub fn record_consumption(&self, characters: u64) {
        let mut state = self.state.lock();
        state.chars_used = state.chars_used.saturating_add(characters);
        self.persist(&state);
    }

    /// Trip the one-way exhaustion switch
    ///
    /// Called when the provider itself reports the shared budget spent;
    /// the primary stays disabled for the rest of the process lifetime.
    pub fn mark_exhausted(&self) {
        let mut state = self.state.lock();
        state.exhausted = true;
        self.persist(&state);
    }

    /// Current quota figures
    #[must_use]
    pub fn status(&self) -> QuotaStatus {
        let state = self.state.lock();
        QuotaStatus {
            consumed: state.chars_used,
            remaining: if state.exhausted {
                0
            } else {
                self.limit.saturating_sub(state.chars_used)
            },
            exhausted: state.exhausted,
        }
    }

    /// Flush state with an atomic replace; failures are logged, never raised
    fn persist(&self, state: &QuotaState) {
        if let Err(e) = self.try_persist(state) {
            warn!(path = %self.path.display(), error = %e, "Could not save quota state");
        }
    }

    fn try_persist(&self, state: &QuotaState) -> std::io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string(state)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path)?;
        Ok(())
    }
}
