// Mon Jan 19 2026 - Alex

use crate::memory::MemoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a long scan stops to ask whether it should give up.
const STOP_CHECK_STRIDE: usize = 0x10000;

/// Where a scan resumes after a hit.
///
/// Values in a target can sit at any byte alignment, so the default reports
/// overlapping hits: after a match at `i` the scan resumes at `i + 1`.
/// `NonOverlapping` resumes at `i + pattern.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    #[default]
    Overlapping,
    NonOverlapping,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlapping => write!(f, "overlapping"),
            Self::NonOverlapping => write!(f, "non-overlapping"),
        }
    }
}

/// Fixed byte sequence searched for, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchPattern {
    bytes: Vec<u8>,
}

/// Offsets found in one buffer, in increasing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub offsets: Vec<usize>,
    pub completed: bool,
}

impl SearchPattern {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MemoryError> {
        if bytes.is_empty() {
            return Err(MemoryError::InvalidPattern("pattern is empty".to_string()));
        }
        Ok(Self { bytes })
    }

    /// The 4-byte little-endian encoding of `value`.
    pub fn from_u32(value: u32) -> Self {
        Self { bytes: value.to_le_bytes().to_vec() }
    }

    pub fn from_i32(value: i32) -> Self {
        Self { bytes: value.to_le_bytes().to_vec() }
    }

    pub fn from_u64(value: u64) -> Self {
        Self { bytes: value.to_le_bytes().to_vec() }
    }

    pub fn from_f32(value: f32) -> Self {
        Self { bytes: value.to_le_bytes().to_vec() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn matches_at(&self, data: &[u8], offset: usize) -> bool {
        data.get(offset..offset + self.bytes.len())
            .map_or(false, |window| window == self.bytes.as_slice())
    }

    /// Every start offset in `data` where the pattern occurs.
    pub fn find_all_in(&self, data: &[u8], policy: OverlapPolicy) -> Vec<usize> {
        self.find_all_until(data, policy, || false).offsets
    }

    /// Like [`find_all_in`](Self::find_all_in), but polls `should_stop` as it
    /// goes and returns early with what it has when told to.
    pub fn find_all_until<F>(&self, data: &[u8], policy: OverlapPolicy, should_stop: F) -> SearchHits
    where
        F: Fn() -> bool,
    {
        let mut hits = SearchHits { offsets: Vec::new(), completed: true };
        let width = self.bytes.len();
        if data.len() < width {
            return hits;
        }

        let last_start = data.len() - width;
        let first = self.bytes[0];
        let step = match policy {
            OverlapPolicy::Overlapping => 1,
            OverlapPolicy::NonOverlapping => width,
        };

        let mut i = 0;
        let mut next_check = 0;
        while i <= last_start {
            if i >= next_check {
                if should_stop() {
                    hits.completed = false;
                    return hits;
                }
                next_check = i + STOP_CHECK_STRIDE;
            }

            let window_end = (last_start + 1).min(next_check);
            match data[i..window_end].iter().position(|&b| b == first) {
                Some(skip) => i += skip,
                None => {
                    i = window_end;
                    continue;
                }
            }

            if &data[i..i + width] == self.bytes.as_slice() {
                hits.offsets.push(i);
                i += step;
            } else {
                i += 1;
            }
        }

        hits
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
