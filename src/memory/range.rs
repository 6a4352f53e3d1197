// Mon Jan 19 2026 - Alex

use crate::memory::Address;
use std::fmt;

/// Lowest and highest addresses the target process may map, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressSpaceBounds {
    minimum: Address,
    maximum: Address,
}

impl AddressSpaceBounds {
    pub fn new(minimum: Address, maximum: Address) -> Self {
        Self { minimum, maximum }
    }

    /// Bounds a platform reports when it has nothing to say.
    pub fn empty() -> Self {
        Self::new(Address::zero(), Address::zero())
    }

    pub fn minimum(&self) -> Address {
        self.minimum
    }

    pub fn maximum(&self) -> Address {
        self.maximum
    }

    /// Zeroed or inverted bounds describe an address space with nothing to walk.
    pub fn is_empty(&self) -> bool {
        self.maximum.as_u64() == 0 || self.maximum <= self.minimum
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.minimum && addr <= self.maximum
    }

    pub fn span(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.maximum - self.minimum
        }
    }
}

impl fmt::Display for AddressSpaceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.minimum, self.maximum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_bounds_are_empty() {
        assert!(AddressSpaceBounds::empty().is_empty());
        assert_eq!(AddressSpaceBounds::empty().span(), 0);
    }

    #[test]
    fn test_inverted_bounds_are_empty() {
        let bounds = AddressSpaceBounds::new(Address::new(0x20000), Address::new(0x10000));
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_bounds_contains_maximum() {
        let bounds = AddressSpaceBounds::new(Address::new(0x10000), Address::new(0x20000));
        assert!(bounds.contains(Address::new(0x20000)));
        assert!(!bounds.contains(Address::new(0x20001)));
        assert!(!bounds.contains(Address::new(0xffff)));
        assert_eq!(bounds.span(), 0x10000);
    }
}
