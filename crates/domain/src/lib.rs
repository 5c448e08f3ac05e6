//! 订阅记录核心领域模型
//!
//! 包含订阅实体、月份粒度的日期值对象、周期过滤条件以及仓储接口。

pub mod errors;
pub mod filter;
pub mod repository;
pub mod subscription;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use filter::PeriodFilter;
pub use repository::*;
pub use subscription::*;
pub use value_objects::*;
