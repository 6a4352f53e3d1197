// Mon Jan 19 2026 - Alex

use crate::memory::AccessRights;
use crate::pattern::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub threads: usize,
    pub overlap: OverlapPolicy,
    pub timeout_seconds: Option<u64>,
    pub access: AccessRights,
    pub min_region_size: u64,
    pub show_progress: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            overlap: OverlapPolicy::Overlapping,
            timeout_seconds: None,
            access: AccessRights::SCAN,
            min_region_size: 0,
            show_progress: true,
        }
    }
}

impl FinderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate().map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("threads must be greater than 0".to_string());
        }
        if !self.access.can_query() || !self.access.can_read() {
            return Err("access must include QUERY_INFORMATION and VM_READ".to_string());
        }
        if self.timeout_seconds == Some(0) {
            return Err("timeout_seconds must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FinderConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.threads >= 1);
        assert_eq!(config.overlap, OverlapPolicy::Overlapping);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(FinderConfig::new().with_threads(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FinderConfig =
            serde_json::from_str(r#"{ "threads": 2, "overlap": "non_overlapping", "timeout_seconds": 30 }"#).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.overlap, OverlapPolicy::NonOverlapping);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.access, AccessRights::SCAN);
    }
}
