// Mon Jan 19 2026 - Alex

pub mod access;
pub mod address;
pub mod error;
pub mod filter;
pub mod handle;
pub mod platform;
pub mod protection;
pub mod range;
pub mod reader;
pub mod record;
pub mod region;
pub mod simulated;
pub mod traits;
pub mod walker;

pub use access::AccessRights;
pub use address::Address;
pub use error::{MemoryError, QueryError};
pub use filter::{is_interesting, RegionFilter};
pub use handle::ProcessHandle;
pub use protection::{MemoryState, MemoryType, PageProtection};
pub use range::AddressSpaceBounds;
pub use reader::{read_region, PartialRead, RegionBuffer};
pub use record::RegionRecordLayout;
pub use region::RegionDescriptor;
pub use simulated::SimulatedMemory;
pub use traits::{MemoryApi, RawHandle};
pub use walker::{collect_regions, RegionWalker, WalkEnd, WalkSummary};
