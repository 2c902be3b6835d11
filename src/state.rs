use crate::controller::GoalController;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Mutex<GoalController>>,
}

impl AppState {
    pub fn new(controller: GoalController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}
