//! 按月份区间筛选订阅。

use crate::errors::DomainError;
use crate::subscription::{Subscription, SubscriptionEnd};
use crate::value_objects::Month;

/// 列表查询的周期条件，上下界均可省略。
///
/// 语义：`start_date >= from`（若给出 from）且 `end_date <= to`（若给出 to）。
/// 给出 `to` 时持续中的订阅一律被排除。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub from: Option<Month>,
    pub to: Option<Month>,
}

impl PeriodFilter {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, DomainError> {
        let from = from.map(|raw| Month::parse("from", raw)).transpose()?;
        let to = to.map(|raw| Month::parse("to", raw)).transpose()?;
        Ok(Self { from, to })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.matches_start(subscription.start_date) && self.matches_end(subscription.end_date)
    }

    fn matches_start(&self, start: Month) -> bool {
        match self.from {
            None => true,
            Some(from) => start >= from,
        }
    }

    fn matches_end(&self, end: SubscriptionEnd) -> bool {
        match (self.to, end) {
            (None, _) => true,
            // 持续中的订阅没有结束月份，与上界比较永远不成立
            (Some(_), SubscriptionEnd::Ongoing) => false,
            (Some(to), SubscriptionEnd::Until(end)) => end <= to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::SubscriptionDraft;
    use crate::value_objects::SubscriptionId;

    fn subscription(start: &str, end: Option<&str>) -> Subscription {
        SubscriptionDraft::parse("user-1", "Yandex Plus", 400, start, end)
            .unwrap()
            .with_id(SubscriptionId::generate())
    }

    #[test]
    fn unbounded_filter_matches_everything() {
        let filter = PeriodFilter::parse(None, None).unwrap();
        assert!(filter.is_unbounded());
        assert!(filter.matches(&subscription("01-2020", None)));
        assert!(filter.matches(&subscription("01-2020", Some("02-2020"))));
    }

    #[test]
    fn to_bound_excludes_ongoing_subscriptions() {
        let filter = PeriodFilter::parse(Some("01-2025"), Some("12-2025")).unwrap();
        assert!(!filter.matches(&subscription("03-2025", None)));
        assert!(filter.matches(&subscription("03-2025", Some("12-2025"))));
    }

    #[test]
    fn bounds_are_inclusive() {
        let filter = PeriodFilter::parse(Some("01-2025"), Some("12-2025")).unwrap();
        assert!(filter.matches(&subscription("01-2025", Some("12-2025"))));
        assert!(!filter.matches(&subscription("12-2024", Some("06-2025"))));
        assert!(!filter.matches(&subscription("02-2025", Some("01-2026"))));
    }

    #[test]
    fn from_only_keeps_ongoing_subscriptions() {
        let filter = PeriodFilter::parse(Some("01-2025"), None).unwrap();
        assert!(filter.matches(&subscription("05-2025", None)));
        assert!(!filter.matches(&subscription("05-2024", None)));
    }

    #[test]
    fn malformed_bounds_are_rejected() {
        assert!(PeriodFilter::parse(Some(""), None).is_err());
        assert!(PeriodFilter::parse(None, Some("2025-07")).is_err());
        assert!(PeriodFilter::parse(Some("13-2025"), None).is_err());
    }
}
