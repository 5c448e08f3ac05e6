use domain::{Subscription, SubscriptionDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApplicationError;

/// 创建与整体替换共用的原始输入，日期为 `MM-YYYY` 文本
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionInput {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    /// 最小货币单位，不能为负
    #[schema(example = 400, minimum = 0)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// 省略表示持续中
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl SubscriptionInput {
    pub fn validate(&self) -> Result<SubscriptionDraft, ApplicationError> {
        Ok(SubscriptionDraft::parse(
            self.user_id.clone(),
            self.service_name.clone(),
            self.price,
            &self.start_date,
            self.end_date.as_deref(),
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub user_id: String,
    pub service_name: String,
    pub price: i64,
    pub start_date: String,
    /// 持续中的订阅不输出该字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionDto {
    fn from(value: Subscription) -> Self {
        Self {
            id: value.id.into(),
            user_id: value.user_id,
            service_name: value.service_name,
            price: value.price,
            start_date: value.start_date.to_string(),
            end_date: value.end_date.month().map(|month| month.to_string()),
        }
    }
}
