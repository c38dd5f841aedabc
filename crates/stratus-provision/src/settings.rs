use crate::poll::PollPolicy;
use std::time::Duration;

pub const DEFAULT_CREATE_TIMEOUT_MINUTES: i32 = 5;
pub const DEFAULT_ROLLBACK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// プロビジョニングの調整パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// CreateStack の TimeoutInMinutes
    pub create_timeout_minutes: i32,
    pub poll: PollPolicy,
    /// ロールバック全体の待ち時間の上限
    pub rollback_timeout: Duration,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            create_timeout_minutes: DEFAULT_CREATE_TIMEOUT_MINUTES,
            poll: PollPolicy::default(),
            rollback_timeout: DEFAULT_ROLLBACK_TIMEOUT,
        }
    }
}
