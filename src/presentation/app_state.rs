// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::domain::selection::Selection;
use tokio::sync::RwLock;

pub struct AppState {
    pub dashboard_service: DashboardService,
    /// Changed only by explicit selection updates, never by a refresh
    pub selection: RwLock<Selection>,
}

impl AppState {
    pub fn new(dashboard_service: DashboardService) -> Self {
        Self {
            dashboard_service,
            selection: RwLock::new(Selection::default()),
        }
    }
}
