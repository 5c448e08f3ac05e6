//! 应用层服务实现。
//!
//! 对外提供订阅记录的五个存储用例：先校验输入，再在超时约束内调用仓储。

pub mod dto;
pub mod error;
pub mod services;

pub use dto::{SubscriptionDto, SubscriptionInput};
pub use error::{ApplicationError, ErrorKind};
pub use services::SubscriptionService;
