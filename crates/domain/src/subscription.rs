use crate::errors::DomainError;
use crate::value_objects::{Month, SubscriptionId};

/// 订阅的结束状态。
///
/// `Ongoing` 是独立的第三种状态，而不仅仅是“没有值”：
/// 周期过滤时它有自己的分支，见 [`crate::PeriodFilter`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEnd {
    /// 无结束月份，持续中
    Ongoing,
    /// 在该月结束（含该月）
    Until(Month),
}

impl SubscriptionEnd {
    pub fn parse(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            None => Ok(Self::Ongoing),
            Some(raw) => Month::parse("end_date", raw).map(Self::Until),
        }
    }

    pub fn month(&self) -> Option<Month> {
        match self {
            Self::Ongoing => None,
            Self::Until(month) => Some(*month),
        }
    }

    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Ongoing)
    }
}

impl From<Option<Month>> for SubscriptionEnd {
    fn from(value: Option<Month>) -> Self {
        value.map_or(Self::Ongoing, Self::Until)
    }
}

/// 经过校验、尚未分配标识的订阅数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDraft {
    pub user_id: String,
    pub service_name: String,
    pub price: i64,
    pub start_date: Month,
    pub end_date: SubscriptionEnd,
}

impl SubscriptionDraft {
    /// 校验原始输入。
    ///
    /// 结束月份早于开始月份时仍然接受。
    pub fn parse(
        user_id: impl Into<String>,
        service_name: impl Into<String>,
        price: i64,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<Self, DomainError> {
        if price < 0 {
            return Err(DomainError::invalid_argument("price", "must not be negative"));
        }
        let start_date = Month::parse("start_date", start_date)?;
        let end_date = SubscriptionEnd::parse(end_date)?;

        Ok(Self {
            user_id: user_id.into(),
            service_name: service_name.into(),
            price,
            start_date,
            end_date,
        })
    }

    pub fn with_id(self, id: SubscriptionId) -> Subscription {
        Subscription {
            id,
            user_id: self.user_id,
            service_name: self.service_name,
            price: self.price,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// 订阅记录，系统中唯一持久化的实体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: String,
    pub service_name: String,
    /// 最小货币单位，无币种字段
    pub price: i64,
    pub start_date: Month,
    pub end_date: SubscriptionEnd,
}
