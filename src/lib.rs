// Mon Jan 19 2026 - Alex

pub mod config;
pub mod finder;
pub mod memory;
pub mod pattern;
pub mod ui;
pub mod window;

pub use config::FinderConfig;
pub use finder::{find_value, FindReport, Finder, MatchRecord, SessionReport};
pub use memory::{MemoryApi, MemoryError, ProcessHandle, SimulatedMemory};
pub use pattern::{CancelToken, OverlapPolicy, PatternScanner, SearchPattern};
pub use window::{WindowInfo, WindowLocator, WindowRect};
