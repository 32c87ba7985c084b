//! External sketch-distance tools
//!
//! The curation pipeline talks to these through [`SketchTool`]; `mash` is
//! the production backend and [`testing::StaticSketchTool`] stands in for it
//! in tests.

pub mod mash;
pub mod testing;
pub mod traits;

pub use mash::MashTool;
pub use testing::StaticSketchTool;
pub use traits::{SketchDistance, SketchTool};
