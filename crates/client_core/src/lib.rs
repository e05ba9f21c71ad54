//! Client-side synchronization core for the attendance dashboard.
//!
//! Holds the roster cache, the daily attendance overview, and the
//! per-employee history view, and sequences every mutation against the
//! external store with the cache reloads that mutation invalidates.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::NaiveDate;
use shared::{
    domain::{AttendanceRecord, AttendanceStatus, Employee, EmployeeId},
    error::StoreError,
    protocol::{MarkAttendance, RegisterEmployee},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod clock;
pub mod config;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use config::{load_settings, prepare_base_url, Settings};
pub use store::{EmployeeStore, HttpStore};

/// Outcome of the operator's confirmation prompt for destructive intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Lifecycle of the attendance history view for one employee.
///
/// `Errored` after a rejected mark keeps the last-known-good records so
/// the view can show them beneath the error; after a failed fetch there
/// is nothing to keep and `last_known` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Closed,
    Loading {
        employee: EmployeeId,
    },
    Loaded {
        employee: EmployeeId,
        records: Vec<AttendanceRecord>,
    },
    Errored {
        employee: EmployeeId,
        message: String,
        last_known: Vec<AttendanceRecord>,
    },
}

impl HistoryView {
    pub fn employee(&self) -> Option<EmployeeId> {
        match self {
            HistoryView::Closed => None,
            HistoryView::Loading { employee }
            | HistoryView::Loaded { employee, .. }
            | HistoryView::Errored { employee, .. } => Some(*employee),
        }
    }
}

impl Default for HistoryView {
    fn default() -> Self {
        HistoryView::Closed
    }
}

/// Cache-change notifications for a presentation layer that re-renders
/// from snapshots rather than polling.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    RosterUpdated,
    DailyStatusUpdated,
    HistoryChanged,
    /// Daily overview fetch failed; the roster stays usable.
    DailyStatusDegraded(String),
}

#[derive(Default)]
struct DashboardState {
    roster: Vec<Employee>,
    daily_status: HashMap<EmployeeId, AttendanceStatus>,
    history: HistoryView,
    // bumped on every open/close; a fetch result is applied only if the
    // epoch it was issued under is still current
    history_epoch: u64,
}

pub struct DashboardClient {
    store: Arc<dyn EmployeeStore>,
    clock: Arc<dyn Clock>,
    inner: Mutex<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardClient {
    pub fn new(store: Arc<dyn EmployeeStore>, clock: Arc<dyn Clock>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            clock,
            inner: Mutex::new(DashboardState::default()),
            events,
        })
    }

    pub fn from_settings(settings: &Settings) -> Arc<Self> {
        Self::new(
            Arc::new(HttpStore::new(settings.api_base_url.clone())),
            Arc::new(SystemClock),
        )
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn roster(&self) -> Vec<Employee> {
        self.inner.lock().await.roster.clone()
    }

    pub async fn daily_status(&self) -> HashMap<EmployeeId, AttendanceStatus> {
        self.inner.lock().await.daily_status.clone()
    }

    pub async fn history(&self) -> HistoryView {
        self.inner.lock().await.history.clone()
    }

    /// Reload the roster and today's overview together so they never
    /// disagree about which employees exist.
    ///
    /// A roster failure leaves both caches untouched and is returned to
    /// the caller as the blocking error for the main view. An overview
    /// failure is logged, emitted as [`DashboardEvent::DailyStatusDegraded`],
    /// and leaves that view empty.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let employees = self.store.list_employees().await.map_err(|err| {
            warn!("roster: reload failed, keeping previous contents: {err}");
            err
        })?;

        let today = self.clock.today();
        let daily = match self.store.daily_attendance(today).await {
            Ok(map) => Some(map),
            Err(err) => {
                warn!(%today, "roster: daily overview fetch failed: {err}");
                let _ = self
                    .events
                    .send(DashboardEvent::DailyStatusDegraded(err.to_string()));
                None
            }
        };

        {
            let mut state = self.inner.lock().await;
            state.roster = employees;
            state.daily_status = match daily {
                Some(mut map) => {
                    // the store may hold records for employees deleted
                    // between the two reads; the overview never shows an
                    // employee the roster does not
                    let ids: HashSet<EmployeeId> = state.roster.iter().map(|e| e.id).collect();
                    map.retain(|id, _| ids.contains(id));
                    map
                }
                None => HashMap::new(),
            };
        }

        let _ = self.events.send(DashboardEvent::RosterUpdated);
        let _ = self.events.send(DashboardEvent::DailyStatusUpdated);
        Ok(())
    }

    /// Register a new employee, then reload the roster so the cache picks
    /// up the server-assigned identity. Never inserts optimistically; a
    /// rejected write leaves the cache untouched.
    pub async fn register_employee(&self, candidate: RegisterEmployee) -> Result<(), StoreError> {
        candidate.validate()?;
        self.store.create_employee(&candidate).await?;
        info!(emp_id = %candidate.emp_id, "roster: employee registered");
        self.refresh().await
    }

    /// Delete an employee. A declined confirmation performs no store call
    /// and returns `Ok(false)`.
    pub async fn delete_employee(
        &self,
        id: EmployeeId,
        confirmation: Confirmation,
    ) -> Result<bool, StoreError> {
        if confirmation == Confirmation::Declined {
            info!(employee_id = id.0, "roster: deletion declined");
            return Ok(false);
        }
        self.store.delete_employee(id).await?;
        info!(employee_id = id.0, "roster: employee deleted");
        self.refresh().await?;
        Ok(true)
    }

    /// Open the history view for one employee. Every open starts a fresh
    /// fetch; nothing is reused from a previously closed view.
    pub async fn open_history(&self, employee: EmployeeId) -> Result<(), StoreError> {
        let epoch = {
            let mut state = self.inner.lock().await;
            state.history_epoch += 1;
            state.history = HistoryView::Loading { employee };
            state.history_epoch
        };
        let _ = self.events.send(DashboardEvent::HistoryChanged);
        self.reload_history(employee, epoch).await
    }

    /// Dismiss the history view and discard its cache. Any fetch still in
    /// flight for it will find the epoch stale and drop its result.
    pub async fn close_history(&self) {
        {
            let mut state = self.inner.lock().await;
            state.history_epoch += 1;
            state.history = HistoryView::Closed;
        }
        let _ = self.events.send(DashboardEvent::HistoryChanged);
    }

    /// Mark attendance for an employee. On success the open history view
    /// (if it is showing that employee) re-enters `Loading` for a full
    /// reload, and roster + daily overview refresh together. On failure
    /// only the history view changes, surfacing the store's message above
    /// the last-known records.
    pub async fn mark_attendance(
        &self,
        employee: EmployeeId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        let request = MarkAttendance {
            employee_id: employee,
            date,
            status,
        };
        match self.store.mark_attendance(&request).await {
            Ok(()) => {
                info!(employee_id = employee.0, %date, ?status, "attendance: marked");
                let epoch = {
                    let mut state = self.inner.lock().await;
                    if state.history.employee() == Some(employee) {
                        state.history_epoch += 1;
                        state.history = HistoryView::Loading { employee };
                        Some(state.history_epoch)
                    } else {
                        None
                    }
                };
                let history_result = match epoch {
                    Some(epoch) => {
                        let _ = self.events.send(DashboardEvent::HistoryChanged);
                        self.reload_history(employee, epoch).await
                    }
                    None => Ok(()),
                };
                self.refresh().await?;
                history_result
            }
            Err(err) => {
                warn!(employee_id = employee.0, %date, "attendance: mark rejected: {err}");
                let mut state = self.inner.lock().await;
                if state.history.employee() == Some(employee) {
                    let last_known = match &state.history {
                        HistoryView::Loaded { records, .. } => records.clone(),
                        HistoryView::Errored { last_known, .. } => last_known.clone(),
                        _ => Vec::new(),
                    };
                    state.history = HistoryView::Errored {
                        employee,
                        message: err.to_string(),
                        last_known,
                    };
                    drop(state);
                    let _ = self.events.send(DashboardEvent::HistoryChanged);
                }
                Err(err)
            }
        }
    }

    /// Fetch the employee's history and apply it only if the view is
    /// still on the epoch the fetch was issued under.
    async fn reload_history(&self, employee: EmployeeId, epoch: u64) -> Result<(), StoreError> {
        let result = self.store.attendance_history(employee).await;
        let mut state = self.inner.lock().await;
        if state.history_epoch != epoch {
            info!(
                employee_id = employee.0,
                "attendance: history response for a dismissed view, discarding"
            );
            return Ok(());
        }
        let outcome = match result {
            Ok(records) => {
                state.history = HistoryView::Loaded { employee, records };
                Ok(())
            }
            Err(err) => {
                state.history = HistoryView::Errored {
                    employee,
                    message: err.to_string(),
                    last_known: Vec::new(),
                };
                Err(err)
            }
        };
        drop(state);
        let _ = self.events.send(DashboardEvent::HistoryChanged);
        outcome
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
