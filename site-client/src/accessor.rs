//! Settings Accessor
//!
//! The one client-side owner of the settings document. It reconciles three
//! sources: the local cache (read synchronously at construction so the first
//! render already has real content), the server (refresh), and the admin's
//! own writes (optimistic update with rollback).
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──refresh──▶ Loading ──▶ Ready | Error
//! Ready | Error ──refresh──▶ Loading
//! Ready | Error ──update───▶ Updating ──▶ Ready | (previous state + error)
//! ```
//!
//! # Ordering
//!
//! Every refresh and update takes a ticket from one monotonically increasing
//! counter. A refresh result is applied only if it is the latest refresh, it
//! started after the last update activity (start or settle), and no update
//! is pending. An update result is applied only if it is the latest update.
//! Anything else is stale and dropped; the caller still gets its result.
//!
//! Overlapping updates share one rollback target: the state before the first
//! of them started, advanced by every write the server confirms. A failed
//! latest update never rolls back onto another update's unconfirmed value.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::models::SiteSettings;
use tokio::sync::watch;

use crate::cache::{CacheStore, SETTINGS_CACHE_KEY};
use crate::error::{CacheError, SettingsError};
use crate::notice::{Notice, Notifier, TracingNotifier};
use crate::service::SettingsService;

/// Accessor lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsStatus {
    /// Nothing cached, nothing fetched yet
    #[default]
    Uninitialized,
    /// Refresh in flight
    Loading,
    Ready,
    /// Last refresh failed; the value shown is the last good one
    Error,
    /// Optimistic write in flight
    Updating,
}

/// What consumers observe
///
/// `settings` is never absent: the empty default stands in until something
/// is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsView {
    pub settings: SiteSettings,
    pub status: SettingsStatus,
    /// Value came from the local cache and has not been confirmed yet
    pub from_cache: bool,
    /// Last failure, cleared by the next success
    pub error: Option<String>,
}

impl SettingsView {
    pub fn is_ready(&self) -> bool {
        self.status == SettingsStatus::Ready
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Last server-confirmed state, the rollback target while writes are in flight
#[derive(Clone)]
struct Snapshot {
    view: SettingsView,
    has_data: bool,
}

impl Snapshot {
    /// The server accepted `settings`
    fn confirm(&mut self, settings: &SiteSettings) {
        self.view = SettingsView {
            settings: settings.clone(),
            status: SettingsStatus::Ready,
            from_cache: false,
            error: None,
        };
        self.has_data = true;
    }
}

struct Inner {
    view: SettingsView,
    /// Something usable was shown at some point (cache hit, fetch, confirmed write)
    has_data: bool,
    seq: u64,
    latest_refresh: u64,
    latest_update: u64,
    /// Ticket of the most recent update start or settle
    latest_write: u64,
    pending_updates: usize,
    /// Taken when the first of a burst of updates starts, dropped when the
    /// last one settles
    base: Option<Snapshot>,
    /// The latest update failed and the view was rolled back to `base`
    latest_failed: bool,
}

impl Inner {
    fn next_ticket(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// Process-wide handle consumers hold
pub type SharedAccessor<S, C> = Arc<SettingsAccessor<S, C>>;

pub struct SettingsAccessor<S, C> {
    service: S,
    cache: C,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner>,
    tx: watch::Sender<SettingsView>,
}

impl<S, C> std::fmt::Debug for SettingsAccessor<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SettingsAccessor")
            .field("status", &inner.view.status)
            .field("from_cache", &inner.view.from_cache)
            .field("seq", &inner.seq)
            .finish_non_exhaustive()
    }
}

impl<S: SettingsService, C: CacheStore> SettingsAccessor<S, C> {
    /// Cold start from the local cache. No network I/O.
    pub fn new(service: S, cache: C) -> Self {
        Self::with_notifier(service, cache, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(service: S, cache: C, notifier: Arc<dyn Notifier>) -> Self {
        let cached = load_cached(&cache);
        let has_data = cached.is_some();
        let view = match cached {
            Some(settings) => SettingsView {
                settings,
                status: SettingsStatus::Ready,
                from_cache: true,
                error: None,
            },
            None => SettingsView::default(),
        };

        tracing::debug!(from_cache = has_data, "Settings accessor created");

        let (tx, _) = watch::channel(view.clone());
        Self {
            service,
            cache,
            notifier,
            inner: Mutex::new(Inner {
                view,
                has_data,
                seq: 0,
                latest_refresh: 0,
                latest_update: 0,
                latest_write: 0,
                pending_updates: 0,
                base: None,
                latest_failed: false,
            }),
            tx,
        }
    }

    /// Wrap in the shared handle
    pub fn shared(self) -> SharedAccessor<S, C> {
        Arc::new(self)
    }

    /// Current document
    pub fn current(&self) -> SiteSettings {
        self.inner.lock().view.settings.clone()
    }

    pub fn view(&self) -> SettingsView {
        self.inner.lock().view.clone()
    }

    pub fn status(&self) -> SettingsStatus {
        self.inner.lock().view.status
    }

    /// Change feed; the receiver starts at the current view
    pub fn subscribe(&self) -> watch::Receiver<SettingsView> {
        self.tx.subscribe()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetch the document from the server
    ///
    /// On failure the shown value and the cache stay as they are; a notice is
    /// raised only when there is nothing at all to show.
    pub async fn refresh(&self) -> Result<(), SettingsError> {
        let ticket = {
            let mut inner = self.inner.lock();
            let ticket = inner.next_ticket();
            inner.latest_refresh = ticket;
            // 写入进行中时保持 Updating
            if inner.pending_updates == 0 {
                inner.view.status = SettingsStatus::Loading;
                self.publish(&inner);
            }
            ticket
        };

        let result = self.service.get_config().await;

        let mut inner = self.inner.lock();
        let fresh = ticket == inner.latest_refresh
            && ticket > inner.latest_write
            && inner.pending_updates == 0;

        match result {
            Ok(settings) => {
                if !fresh {
                    tracing::debug!(ticket, "Discarding stale settings refresh");
                    return Ok(());
                }
                self.write_cache(&settings);
                inner.view = SettingsView {
                    settings,
                    status: SettingsStatus::Ready,
                    from_cache: false,
                    error: None,
                };
                inner.has_data = true;
                self.publish(&inner);
                tracing::debug!(ticket, "Settings refreshed");
                Ok(())
            }
            Err(e) => {
                if fresh {
                    let nothing_to_show = !inner.has_data;
                    inner.view.status = SettingsStatus::Error;
                    inner.view.error = Some(e.to_string());
                    self.publish(&inner);
                    drop(inner);

                    tracing::warn!(error = %e, "Settings refresh failed");
                    if nothing_to_show {
                        self.notifier
                            .notify(Notice::error("Site settings could not be loaded"));
                    }
                } else {
                    tracing::debug!(ticket, error = %e, "Ignoring failure of stale refresh");
                }
                Err(SettingsError::FetchFailed(e))
            }
        }
    }

    /// Replace the whole document, optimistically
    ///
    /// The new value is visible (and cached) before the server answers. On
    /// failure both go back to the last server-confirmed state, even when
    /// several updates overlap. Callers build the full merged document
    /// themselves.
    pub async fn update(&self, settings: SiteSettings) -> Result<SiteSettings, SettingsError> {
        let ticket = {
            let mut inner = self.inner.lock();
            if inner.pending_updates == 0 {
                inner.base = Some(Snapshot {
                    view: inner.view.clone(),
                    has_data: inner.has_data,
                });
            }

            let ticket = inner.next_ticket();
            inner.latest_update = ticket;
            inner.latest_write = ticket;
            inner.latest_failed = false;
            inner.pending_updates += 1;

            self.write_cache(&settings);
            inner.view.settings = settings.clone();
            inner.view.status = SettingsStatus::Updating;
            inner.view.from_cache = false;
            self.publish(&inner);
            ticket
        };

        let result = self.service.replace_config(&settings).await;

        let mut inner = self.inner.lock();
        inner.pending_updates = inner.pending_updates.saturating_sub(1);
        let settled = inner.next_ticket();
        inner.latest_write = settled;
        let latest = ticket == inner.latest_update;

        let outcome = match result {
            Ok(stored) => {
                if let Some(base) = inner.base.as_mut() {
                    base.confirm(&stored);
                }
                if latest {
                    // 已乐观写入，这里只确认状态
                    inner.view.status = SettingsStatus::Ready;
                    inner.view.error = None;
                    inner.has_data = true;
                    self.publish(&inner);
                } else if inner.latest_failed {
                    // 最新的写入已回滚，服务器现在持有这一份
                    let error = inner.view.error.take();
                    self.restore(&mut inner, error);
                } else {
                    tracing::debug!(ticket, "Superseded settings update confirmed");
                }
                tracing::info!(ticket, "Settings saved");
                Ok(stored)
            }
            Err(e) => {
                if latest {
                    inner.latest_failed = true;
                    self.restore(&mut inner, Some(e.to_string()));
                } else if inner.latest_failed {
                    let error = inner.view.error.take();
                    self.restore(&mut inner, error);
                } else {
                    tracing::debug!(ticket, "Superseded settings update failed");
                }
                Err(e)
            }
        };

        if inner.pending_updates == 0 {
            inner.base = None;
        }
        drop(inner);

        outcome.map_err(|e| {
            tracing::warn!(error = %e, "Settings update failed, changes reverted");
            self.notifier.notify(Notice::error(
                "Settings could not be saved; your changes were reverted",
            ));
            SettingsError::WriteFailed(e)
        })
    }

    /// Roll back to the last confirmed state, cache included
    fn restore(&self, inner: &mut Inner, error: Option<String>) {
        let Some(Snapshot { mut view, has_data }) = inner.base.clone() else {
            return;
        };

        // An interrupted Loading never settles on its own
        view.status = match view.status {
            SettingsStatus::Loading if has_data => SettingsStatus::Ready,
            SettingsStatus::Loading => SettingsStatus::Uninitialized,
            other => other,
        };
        // 仍有写入在途
        if inner.pending_updates > 0 {
            view.status = SettingsStatus::Updating;
        }
        view.error = error;

        if has_data {
            self.write_cache(&view.settings);
        } else if let Err(e) = self.cache.remove(SETTINGS_CACHE_KEY) {
            tracing::warn!(error = %e, "Failed to clear settings cache");
        }

        inner.view = view;
        inner.has_data = has_data;
        self.publish(inner);
    }

    fn write_cache(&self, settings: &SiteSettings) {
        let result = serde_json::to_string(settings)
            .map_err(CacheError::from)
            .and_then(|raw| self.cache.store(SETTINGS_CACHE_KEY, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write settings cache");
        }
    }

    fn publish(&self, inner: &Inner) {
        self.tx.send_replace(inner.view.clone());
    }
}

/// Read the cached document; corrupt entries are removed and count as a miss
fn load_cached<C: CacheStore>(cache: &C) -> Option<SiteSettings> {
    let raw = match cache.load(SETTINGS_CACHE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read settings cache");
            return None;
        }
    };

    match serde_json::from_str::<SiteSettings>(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::debug!(error = %CacheError::from(e), "Discarding settings cache entry");
            if let Err(e) = cache.remove(SETTINGS_CACHE_KEY) {
                tracing::warn!(error = %e, "Failed to remove corrupt settings cache");
            }
            None
        }
    }
}
