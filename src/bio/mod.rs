pub mod classify;
pub mod fasta;
pub mod normalize;
pub mod sequence;

pub use classify::{ClassLabel, RepliconType};
pub use normalize::Fingerprint;
pub use sequence::Sequence;
