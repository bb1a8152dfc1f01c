//! Range Model
//!
//! Range data types and id generation.

pub mod id;
pub mod schema;

pub use id::{generate_range_id, is_range_id};
pub use schema::{Bounds, Range, RangeProposal, RangeUpdate};
