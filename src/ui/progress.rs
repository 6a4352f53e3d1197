// Mon Jan 19 2026 - Alex

use crate::memory::RegionDescriptor;
use crate::pattern::ScanObserver;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} regions ({percent}%) {msg}";

pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        if !enabled {
            self.multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        self
    }

    pub fn create_scan_progress(&self, regions: usize) -> ScanProgress {
        let bar = if self.enabled {
            let pb = self.multi.add(ProgressBar::new(regions as u64));
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                pb.set_style(style.progress_chars("█▓▒░ "));
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        ScanProgress {
            bar,
            matches: AtomicU64::new(0),
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Region-level progress for one search; safe to drive from worker threads.
pub struct ScanProgress {
    bar: ProgressBar,
    matches: AtomicU64,
}

impl ScanProgress {
    pub fn matches(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_with_message(format!("{} matches", self.matches()));
    }

    pub fn abandon(&self, reason: &str) {
        self.bar.abandon_with_message(reason.to_string());
    }
}

impl ScanObserver for ScanProgress {
    fn region_scanned(&self, region: &RegionDescriptor, matches: usize) {
        let total = self.matches.fetch_add(matches as u64, Ordering::Relaxed) + matches as u64;
        self.bar.inc(1);
        self.bar.set_message(format!("{} matches, last {}", total, region.base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Address;

    #[test]
    fn test_hidden_progress_still_counts() {
        let manager = ProgressManager::new().with_enabled(false);
        let progress = manager.create_scan_progress(3);

        let region = RegionDescriptor::private_read_write(Address::new(0x10000), 0x1000);
        progress.region_scanned(&region, 2);
        progress.region_scanned(&region, 0);
        progress.region_scanned(&region, 5);

        assert_eq!(progress.matches(), 7);
        assert_eq!(progress.position(), 3);
        progress.finish();
    }
}
