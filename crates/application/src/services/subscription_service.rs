use std::{sync::Arc, time::Duration};

use domain::{
    PeriodFilter, RepositoryError, RepositoryFuture, Subscription, SubscriptionId,
    SubscriptionRepository,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{dto::SubscriptionInput, error::ApplicationError};

/// 订阅存储用例。
///
/// 校验总是先于任何存储调用；每次存储调用受独立的超时约束，超时后不重试。
#[derive(Clone)]
pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepository>,
    request_timeout: Duration,
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, request_timeout: Duration) -> Self {
        Self {
            repository,
            request_timeout,
        }
    }

    pub async fn create(
        &self,
        input: SubscriptionInput,
    ) -> Result<SubscriptionId, ApplicationError> {
        let draft = input.validate()?;
        let subscription = draft.with_id(SubscriptionId::generate());

        let stored = self
            .within("create", self.repository.create(subscription))
            .await?;
        info!(id = %stored.id, user_id = %stored.user_id, "订阅已创建");
        Ok(stored.id)
    }

    pub async fn get(&self, id: &str) -> Result<Subscription, ApplicationError> {
        let subscription_id = parse_id(id)?;

        match self
            .within("get", self.repository.find_by_id(subscription_id))
            .await?
        {
            Some(subscription) => Ok(subscription),
            None => {
                debug!(%id, "订阅不存在");
                Err(ApplicationError::not_found(id))
            }
        }
    }

    /// 整体替换，所有字段都被覆盖
    pub async fn update(
        &self,
        id: &str,
        input: SubscriptionInput,
    ) -> Result<Subscription, ApplicationError> {
        let draft = input.validate()?;
        let subscription_id = parse_id(id)?;

        let updated = self
            .within("update", self.repository.update(draft.with_id(subscription_id)))
            .await
            .map_err(|err| not_found_as(id, err))?;
        info!(%id, "订阅已更新");
        Ok(updated)
    }

    /// 删除不存在的记录返回 NotFound，而不是成功
    pub async fn delete(&self, id: &str) -> Result<(), ApplicationError> {
        let subscription_id = parse_id(id)?;

        self.within("delete", self.repository.delete(subscription_id))
            .await
            .map_err(|err| not_found_as(id, err))?;
        info!(%id, "订阅已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<Subscription>, ApplicationError> {
        let filter = PeriodFilter::parse(from, to)?;
        let items = self.within("list", self.repository.list(filter)).await?;
        debug!(count = items.len(), ?filter, "订阅列表查询完成");
        Ok(items)
    }

    async fn within<T>(
        &self,
        operation: &'static str,
        future: RepositoryFuture<T>,
    ) -> Result<T, ApplicationError> {
        match timeout(self.request_timeout, future).await {
            Ok(result) => result.map_err(ApplicationError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "存储操作超时"
                );
                Err(ApplicationError::Timeout { operation })
            }
        }
    }
}

fn parse_id(id: &str) -> Result<SubscriptionId, ApplicationError> {
    SubscriptionId::parse(id).ok_or_else(|| {
        debug!(%id, "标识不是合法的 UUID，按不存在处理");
        ApplicationError::not_found(id)
    })
}

fn not_found_as(id: &str, err: ApplicationError) -> ApplicationError {
    match err {
        ApplicationError::Repository(RepositoryError::NotFound) => {
            debug!(%id, "订阅不存在");
            ApplicationError::not_found(id)
        }
        other => other,
    }
}
