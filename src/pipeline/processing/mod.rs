//! The deduplication and validation stages.
//!
//! Data flow: raw roster → normalize → blocking → within-block similarity
//! scoring → cluster formation. Validation checks run independently over
//! the roster joined against the license and NPI reference tables.

pub mod blocking;
pub mod clustering;
pub mod normalize;
pub mod similarity;
pub mod validation;
