//! User-facing notices
//!
//! The accessor decides *when* the user has to be told something; how it is
//! shown (toast, banner, log line) belongs to the embedding UI.

use parking_lot::Mutex;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message meant for the person using the site or back office
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Sink for user notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default sink: logs through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(target: "notice", "{}", notice.message),
            NoticeLevel::Error => tracing::warn!(target: "notice", "{}", notice.message),
        }
    }
}

/// Keeps every notice in memory (tests, headless embedding)
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
