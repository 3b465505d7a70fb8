//! File-resident storage for fountain rows: memory-mapped views bounded by a
//! sliding window or a handle cache, and the Gaussian problems built on them.

pub mod map;
pub mod window;
pub mod fountain;
pub mod in_place;
pub mod segmented;

pub use map::{Access, Mapping};
pub use window::SlidingWindow;
pub use fountain::FountainFileProblem;
pub use in_place::InPlaceProblem;
pub use segmented::{write_slice, SegmentedProblem};

/// Default sliding-window minimum mapping (100 MiB).
pub const DEFAULT_MAP_SIZE: usize = 100 * 1024 * 1024;

/// Mapped handles kept alive at once by the cache-backed problems.
pub const DEFAULT_CACHE_SLOTS: usize = 3;
