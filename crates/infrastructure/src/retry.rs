use std::time::Duration;

/// 两次尝试之间的等待策略。
///
/// 线性增长：第 n 次失败后等待 `step * n`，不加抖动。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backoff {
    Linear { step: Duration },
}

impl Backoff {
    pub fn linear(step: Duration) -> Self {
        Backoff::Linear { step }
    }

    pub fn delay_at(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Linear { step } => step.saturating_mul(attempt),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// 每次构建或探活各自独立的超时
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Backoff::linear(Duration::from_secs(1)),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&config::DatabaseConfig> for RetryConfig {
    fn from(value: &config::DatabaseConfig) -> Self {
        Self {
            max_attempts: value.connect_attempts,
            backoff: Backoff::linear(value.backoff_step()),
            attempt_timeout: value.attempt_timeout(),
        }
    }
}
