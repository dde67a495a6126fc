//! Politeness delay applied by each worker after its fetch

use crate::config::PolitenessConfig;
use rand::Rng;
use std::time::Duration;

/// How long a worker pauses after fetching a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Always the same pause
    Fixed(Duration),

    /// A pause drawn uniformly from `min..=max`
    Range { min: Duration, max: Duration },
}

impl DelayPolicy {
    /// A fixed delay takes precedence over the range when both are configured
    pub fn from_config(config: &PolitenessConfig) -> Self {
        match config.fixed_delay_ms {
            Some(ms) => DelayPolicy::Fixed(Duration::from_millis(ms)),
            None => DelayPolicy::Range {
                min: Duration::from_millis(config.min_delay_ms),
                max: Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms)),
            },
        }
    }

    /// Picks the next pause
    pub fn sample(&self) -> Duration {
        match *self {
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Range { min, max } if min >= max => min,
            DelayPolicy::Range { min, max } => {
                let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(millis as u64)
            }
        }
    }

    /// Sleeps for a sampled pause
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!("Politeness delay {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::from_config(&PolitenessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        assert_eq!(
            DelayPolicy::default(),
            DelayPolicy::Range {
                min: Duration::from_millis(1500),
                max: Duration::from_millis(3500),
            }
        );
    }

    #[test]
    fn test_fixed_delay_wins() {
        let config = PolitenessConfig {
            fixed_delay_ms: Some(2000),
            ..PolitenessConfig::default()
        };
        let policy = DelayPolicy::from_config(&config);
        assert_eq!(policy, DelayPolicy::Fixed(Duration::from_millis(2000)));
        assert_eq!(policy.sample(), Duration::from_millis(2000));
    }

    #[test]
    fn test_range_samples_stay_in_bounds() {
        let policy = DelayPolicy::Range {
            min: Duration::from_millis(10),
            max: Duration::from_millis(20),
        };
        for _ in 0..200 {
            let delay = policy.sample();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(20));
        }
    }

    #[test]
    fn test_degenerate_range() {
        let policy = DelayPolicy::Range {
            min: Duration::from_millis(5),
            max: Duration::from_millis(5),
        };
        assert_eq!(policy.sample(), Duration::from_millis(5));
        assert_eq!(DelayPolicy::Fixed(Duration::ZERO).sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_wait_sleeps_at_least_the_delay() {
        let policy = DelayPolicy::Fixed(Duration::from_millis(30));
        let start = std::time::Instant::now();
        policy.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
