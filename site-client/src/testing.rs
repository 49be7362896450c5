//! Scripted settings service for unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::models::SiteSettings;
use tokio::sync::Notify;

use crate::error::{ClientError, ClientResult};
use crate::service::SettingsService;

/// In-memory "server" with switchable failures and optional gates that
/// hold a call until the test releases it
pub struct FakeService {
    remote: Mutex<SiteSettings>,
    fail_fetch: AtomicBool,
    fail_write: AtomicBool,
    /// Writes whose call index is at or past this value fail
    fail_writes_from: AtomicUsize,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    write_gate: Mutex<Option<Arc<Notify>>>,
    fetch_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

fn server_error() -> ClientError {
    ClientError::Api {
        code: 9001,
        message: "Internal server error".to_string(),
        details: None,
    }
}

impl FakeService {
    pub fn new(remote: SiteSettings) -> Self {
        Self {
            remote: Mutex::new(remote),
            fail_fetch: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            fail_writes_from: AtomicUsize::new(usize::MAX),
            fetch_gate: Mutex::new(None),
            write_gate: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn remote(&self) -> SiteSettings {
        self.remote.lock().clone()
    }

    pub fn set_remote(&self, settings: SiteSettings) {
        *self.remote.lock() = settings;
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Let the first `n` writes through, fail every later one
    pub fn fail_writes_from(&self, n: usize) {
        self.fail_writes_from.store(n, Ordering::SeqCst);
    }

    /// Fetches read the remote value immediately, then wait for the gate
    pub fn gate_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock() = Some(gate.clone());
        gate
    }

    /// Writes wait for the gate before touching the remote value
    pub fn gate_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.write_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsService for FakeService {
    async fn get_config(&self) -> ClientResult<SiteSettings> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.remote();
        let fail = self.fail_fetch.load(Ordering::SeqCst);

        let gate = self.fetch_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if fail { Err(server_error()) } else { Ok(snapshot) }
    }

    async fn replace_config(&self, settings: &SiteSettings) -> ClientResult<SiteSettings> {
        let call = self.write_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.write_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_write.load(Ordering::SeqCst)
            || call >= self.fail_writes_from.load(Ordering::SeqCst)
        {
            return Err(server_error());
        }
        self.set_remote(settings.clone());
        Ok(settings.clone())
    }
}
