use std::sync::Arc;

use application::SubscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub subscription_service: Arc<SubscriptionService>,
}

impl AppState {
    pub fn new(subscription_service: Arc<SubscriptionService>) -> Self {
        Self {
            subscription_service,
        }
    }
}
