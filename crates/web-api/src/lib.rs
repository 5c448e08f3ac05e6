//! Web API 层。
//!
//! 提供 Axum 路由，把 HTTP 请求委托给应用层的订阅服务。

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::{router, ApiDoc, HttpSettings, OPENAPI_PATH};
pub use state::AppState;
