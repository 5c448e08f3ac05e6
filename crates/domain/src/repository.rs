use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::filter::PeriodFilter;
use crate::subscription::Subscription;
use crate::value_objects::SubscriptionId;

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

/// 订阅持久化接口。
///
/// `update` 与 `delete` 在没有匹配记录时返回 [`RepositoryError::NotFound`]，
/// 不会静默成功，也不会插入新记录。
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SubscriptionRepository: Send + Sync {
    fn create(&self, subscription: Subscription) -> RepositoryFuture<Subscription>;
    fn find_by_id(&self, id: SubscriptionId) -> RepositoryFuture<Option<Subscription>>;
    fn update(&self, subscription: Subscription) -> RepositoryFuture<Subscription>;
    fn delete(&self, id: SubscriptionId) -> RepositoryFuture<()>;
    fn list(&self, filter: PeriodFilter) -> RepositoryFuture<Vec<Subscription>>;
}
