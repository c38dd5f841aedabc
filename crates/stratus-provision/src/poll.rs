//! スタック状態のポーリング間隔

use rand::Rng;
use std::time::Duration;

/// ポーリング間隔の決め方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPolicy {
    /// `[min, max]` の一様乱数（複数デプロイが同時に走ってもAPI呼び出しが揃わないように）
    Uniform { min: Duration, max: Duration },
    /// 固定間隔（テスト用に `Duration::ZERO` も可）
    Fixed(Duration),
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::Uniform {
            min: Duration::from_secs(11),
            max: Duration::from_secs(24),
        }
    }
}

impl PollPolicy {
    /// 次の待機時間
    pub fn next_delay(&self) -> Duration {
        match *self {
            PollPolicy::Fixed(delay) => delay,
            PollPolicy::Uniform { min, max } if max <= min => min,
            PollPolicy::Uniform { min, max } => {
                let millis = rand::rng().random_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
            }
        }
    }
}
