use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// 订阅唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// 生成新的随机标识，仅在创建时调用。
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// 解析外部传入的文本标识；不是合法 UUID 的文本不可能匹配任何记录。
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriptionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<SubscriptionId> for Uuid {
    fn from(value: SubscriptionId) -> Self {
        value.0
    }
}

/// 月份粒度的日期，日固定为 1 号。
///
/// 边界上的文本格式为 `MM-YYYY`，例如 `07-2025`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    /// 严格按照 `MM-YYYY` 解析，任何其他形态都被拒绝。
    pub fn parse(field: &str, value: &str) -> Result<Self, DomainError> {
        let invalid =
            || DomainError::invalid_argument(field, format!("expected MM-YYYY, got {value:?}"));

        let bytes = value.as_bytes();
        if bytes.len() != 7 || bytes[2] != b'-' {
            return Err(invalid());
        }
        let (month_part, year_part) = (&value[..2], &value[3..]);
        if !month_part.bytes().chain(year_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(DomainError::invalid_argument(
                field,
                format!("month out of range in {value:?}"),
            ));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(invalid)
    }

    /// 丢弃日信息，归一到当月 1 号。
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl From<Month> for NaiveDate {
    fn from(value: Month) -> Self {
        value.0
    }
}
