use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use application::SubscriptionService;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use domain::{
    PeriodFilter, RepositoryError, RepositoryFuture, Subscription, SubscriptionId,
    SubscriptionRepository,
};
use serde_json::Value;
use tower::ServiceExt;
use web_api::{router as build_router_fn, AppState, HttpSettings};

// 内存仓储，只用于路由测试
#[derive(Default, Clone)]
pub struct MemorySubscriptionRepository {
    rows: Arc<Mutex<HashMap<SubscriptionId, Subscription>>>,
}

impl MemorySubscriptionRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl SubscriptionRepository for MemorySubscriptionRepository {
    fn create(&self, subscription: Subscription) -> RepositoryFuture<Subscription> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if rows.contains_key(&subscription.id) {
                return Err(RepositoryError::Conflict);
            }
            rows.insert(subscription.id, subscription.clone());
            Ok(subscription)
        })
    }

    fn find_by_id(&self, id: SubscriptionId) -> RepositoryFuture<Option<Subscription>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.lock().unwrap().get(&id).cloned()) })
    }

    fn update(&self, subscription: Subscription) -> RepositoryFuture<Subscription> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            match rows.get_mut(&subscription.id) {
                Some(row) => {
                    *row = subscription.clone();
                    Ok(subscription)
                }
                None => Err(RepositoryError::NotFound),
            }
        })
    }

    fn delete(&self, id: SubscriptionId) -> RepositoryFuture<()> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        })
    }

    fn list(&self, filter: PeriodFilter) -> RepositoryFuture<Vec<Subscription>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .values()
                .filter(|subscription| filter.matches(subscription))
                .cloned()
                .collect())
        })
    }
}

pub fn build_router(repository: MemorySubscriptionRepository) -> Router {
    let service = SubscriptionService::new(Arc::new(repository), Duration::from_secs(5));
    build_router_fn(AppState::new(Arc::new(service)), HttpSettings::default())
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
