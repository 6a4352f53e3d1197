// Mon Jan 19 2026 - Alex

pub mod cancel;
pub mod match_result;
pub mod pattern;
pub mod scanner;

pub use cancel::CancelToken;
pub use match_result::{MatchResult, ResultAggregator};
pub use pattern::{OverlapPolicy, SearchHits, SearchPattern};
pub use scanner::{NoProgress, PatternScanner, ScanObserver, SearchOutcome};
