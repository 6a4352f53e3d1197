// Mon Jan 19 2026 - Alex

use crate::memory::RegionDescriptor;

/// Committed, private, plain read-write and not a guard page.
pub fn is_interesting(region: &RegionDescriptor) -> bool {
    region.state.is_committed()
        && region.kind.is_private()
        && region.protect.is_read_write()
        && !region.protect.is_guarded()
}

/// Predicate applied to every region a walk visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionFilter {
    min_size: u64,
}

impl RegionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also drop regions smaller than `min_size` bytes.
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn accepts(&self, region: &RegionDescriptor) -> bool {
        is_interesting(region) && region.size >= self.min_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Address, MemoryState, MemoryType, PageProtection};

    fn base() -> RegionDescriptor {
        RegionDescriptor::private_read_write(Address::new(0x10000), 0x1000)
    }

    #[test]
    fn test_private_read_write_committed_is_interesting() {
        assert!(is_interesting(&base()));
    }

    #[test]
    fn test_read_only_is_excluded() {
        let region = base().with_protect(PageProtection::READONLY);
        assert!(region.state.is_committed());
        assert!(region.kind.is_private());
        assert!(!is_interesting(&region));
    }

    #[test]
    fn test_guard_flag_excludes_regardless() {
        let region = base().with_protect(PageProtection::READWRITE | PageProtection::GUARD);
        assert!(!is_interesting(&region));

        let noisy = base()
            .with_protect(PageProtection::READWRITE | PageProtection::GUARD | PageProtection::NOCACHE)
            .with_kind(MemoryType::PRIVATE)
            .with_state(MemoryState::COMMIT);
        assert!(!is_interesting(&noisy));
    }

    #[test]
    fn test_other_protections_are_excluded() {
        for protect in [
            PageProtection::EXECUTE,
            PageProtection::EXECUTE_READ,
            PageProtection::EXECUTE_READWRITE,
            PageProtection::WRITECOPY,
            PageProtection::NOACCESS,
        ] {
            assert!(!is_interesting(&base().with_protect(protect)), "{}", protect);
        }
    }

    #[test]
    fn test_state_and_type_are_required() {
        assert!(!is_interesting(&base().with_state(MemoryState::RESERVE)));
        assert!(!is_interesting(&base().with_kind(MemoryType::MAPPED)));
        assert!(!is_interesting(&base().with_kind(MemoryType::IMAGE)));
    }

    #[test]
    fn test_min_size() {
        let filter = RegionFilter::new().with_min_size(0x2000);
        assert!(!filter.accepts(&base()));
        assert!(RegionFilter::new().accepts(&base()));
    }
}
