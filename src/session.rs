//! Comparison session: owns the current result and tells subscribers when
//! it changes.
//!
//! Every failure is absorbed here and turned into a notification; nothing
//! escapes to the caller.

use crate::compare::{self, CompareError, ComparisonEntry, DiffResult};
use crate::vcs::{self, Shelveset, VcsError, VersionControl};
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Something subscribers may want to redraw for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The whole result was replaced
    ResultReplaced,
    SummaryChanged(String),
    FilterChanged,
    ShelvesetsChanged,
    Notification {
        level: NotificationLevel,
        message: String,
    },
}

type Subscriber = Box<dyn FnMut(&SessionEvent)>;

/// Holds the busy flag for the duration of a backend call. The flag is
/// cleared on drop, so an error return or an unwind leaves it unset.
struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BusyGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct ComparisonSession<B> {
    backend: Option<B>,
    result: DiffResult,
    shelvesets: Vec<Shelveset>,
    filter: String,
    busy: Cell<bool>,
    subscribers: Vec<Subscriber>,
}

impl<B: VersionControl> ComparisonSession<B> {
    /// `None` means no version control backend could be reached
    pub fn new(backend: Option<B>) -> Self {
        Self {
            backend,
            result: DiffResult::default(),
            shelvesets: Vec::new(),
            filter: String::new(),
            busy: Cell::new(false),
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn result(&self) -> &DiffResult {
        &self.result
    }

    pub fn shelvesets(&self) -> &[Shelveset] {
        &self.shelvesets
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.emit(SessionEvent::FilterChanged);
    }

    /// Current entries with the filter applied
    pub fn files(&self) -> Vec<&ComparisonEntry> {
        self.result.apply_filter(Some(&self.filter))
    }

    /// Run a comparison and publish its result.
    ///
    /// Returns whether a new result was published. Taking `&mut self`
    /// keeps two comparisons from overlapping on one session.
    pub fn compare(&mut self, first: Option<&Shelveset>, second: Option<&Shelveset>) -> bool {
        let outcome = {
            let _busy = BusyGuard::new(&self.busy);
            match &self.backend {
                Some(backend) => compare::compare(backend, first, second),
                None => Err(CompareError::BackendUnavailable),
            }
        };

        match outcome {
            Ok(result) => {
                self.publish(result);
                true
            }
            Err(CompareError::BackendUnavailable) => {
                tracing::warn!("no version control backend available");
                self.publish(DiffResult::connection_error());
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "comparison failed");
                self.notify(NotificationLevel::Error, e.to_string());
                false
            }
        }
    }

    /// Reload the shelveset list for one or two users.
    ///
    /// A non-blank user that is neither an account nor a display name is
    /// rejected with a notification and leaves the list untouched.
    pub fn refresh_shelvesets(
        &mut self,
        first_user: Option<&str>,
        second_user: Option<&str>,
    ) -> bool {
        let outcome = {
            let _busy = BusyGuard::new(&self.busy);
            match &self.backend {
                Some(backend) => load_shelvesets(backend, first_user, second_user),
                None => Err(CompareError::BackendUnavailable),
            }
        };

        match outcome {
            Ok(shelvesets) => {
                self.shelvesets = shelvesets;
                self.emit(SessionEvent::ShelvesetsChanged);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to refresh shelvesets");
                self.notify(NotificationLevel::Error, e.to_string());
                false
            }
        }
    }

    fn publish(&mut self, result: DiffResult) {
        self.result = result;
        self.emit(SessionEvent::ResultReplaced);
        let summary = self.result.summary.clone();
        self.emit(SessionEvent::SummaryChanged(summary));
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.emit(SessionEvent::Notification {
            level,
            message: message.into(),
        });
    }

    fn emit(&mut self, event: SessionEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

fn load_shelvesets<B: VersionControl>(
    backend: &B,
    first_user: Option<&str>,
    second_user: Option<&str>,
) -> Result<Vec<Shelveset>, CompareError> {
    let resolve = |user: Option<&str>| -> Result<Option<String>, VcsError> {
        match user.map(str::trim).filter(|u| !u.is_empty()) {
            Some(user) => vcs::resolve_user(backend, user).map(Some),
            None => Ok(None),
        }
    };

    let first = resolve(first_user)?;
    let second = resolve(second_user)?;

    Ok(vcs::list_shelvesets(backend, first.as_deref(), second.as_deref())?)
}
