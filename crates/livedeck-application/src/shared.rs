//! The lock-guarded dashboard shared between the delivery task, the alert
//! timers and readers.

use livedeck_core::{Dashboard, DashboardSettings, DashboardView};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type SharedDashboard = Arc<RwLock<Dashboard>>;

pub fn shared_dashboard(settings: DashboardSettings) -> SharedDashboard {
    Arc::new(RwLock::new(Dashboard::new(settings)))
}

/// Store mutations never panic mid-update, so a poisoned lock still guards
/// consistent state.
pub fn write_dashboard(dashboard: &SharedDashboard) -> RwLockWriteGuard<'_, Dashboard> {
    dashboard.write().unwrap_or_else(PoisonError::into_inner)
}

pub fn read_dashboard(dashboard: &SharedDashboard) -> RwLockReadGuard<'_, Dashboard> {
    dashboard.read().unwrap_or_else(PoisonError::into_inner)
}

/// Consistent copy of the whole dashboard.
pub fn view(dashboard: &SharedDashboard) -> DashboardView {
    read_dashboard(dashboard).view()
}
