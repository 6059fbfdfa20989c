use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::FilterType;

/// Settings of a [`Resampler`](crate::Resampler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Kernel used by [`Resampler::resample`](crate::Resampler::resample).
    pub filter: FilterType,
    /// Worker count of a dedicated pool. `None` runs on the global rayon pool.
    pub threads: Option<usize>,
}

impl ResampleConfig {
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter,
            threads: None,
        }
    }

    /// Builder method to set the filter.
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Builder method to run on a dedicated pool of `threads` workers.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig(
                "thread count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_lanczos_on_global_pool() {
        let config = ResampleConfig::default();
        assert_eq!(config.filter, FilterType::Lanczos3);
        assert_eq!(config.threads, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_threads_is_invalid() {
        let config = ResampleConfig::default().threads(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn parses_partial_json() {
        let config: ResampleConfig = serde_json::from_str(r#"{ "threads": 2 }"#).unwrap();
        assert_eq!(config, ResampleConfig::default().threads(2));

        let config: ResampleConfig = serde_json::from_str(r#"{ "filter": "mitchell" }"#).unwrap();
        assert_eq!(config.filter, FilterType::Mitchell);
        assert_eq!(config.threads, None);
    }
}
