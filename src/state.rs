use crate::dashboard::{DashboardState, Event};
use crate::source::SourceChain;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub sources: Arc<SourceChain>,
    pub dashboard: Arc<Mutex<DashboardState>>,
}

impl AppState {
    pub fn new(sources: SourceChain, dashboard: DashboardState) -> Self {
        Self {
            sources: Arc::new(sources),
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }

    /// Replaces the current snapshot with the one `event` produces and
    /// returns a copy of it.
    pub async fn dispatch(&self, event: Event) -> DashboardState {
        let mut current = self.dashboard.lock().await;
        let next = current.clone().apply(event);
        *current = next.clone();
        next
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.dashboard.lock().await.clone()
    }
}
