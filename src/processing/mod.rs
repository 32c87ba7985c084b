//! Curation pipeline: per-record filtering, run-wide bookkeeping and the
//! cross-split near-duplicate pass.

pub mod curator;
pub mod dedup;
pub mod host_map;
pub mod manifest;
pub mod resolver;
pub mod split;
pub mod stats;

pub use curator::{CurationReport, Curator};
pub use dedup::DedupIndex;
pub use host_map::{HostEntry, HostMap};
pub use manifest::{ManifestRow, ManifestWriter};
pub use resolver::{NearDuplicateResolver, ResolutionReport, SplitFiles};
pub use split::Split;
pub use stats::{Counter, RunStats};
