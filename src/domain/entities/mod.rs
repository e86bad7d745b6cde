//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Records read back from the store use
//! the bare name ([`Link`], [`Click`]); the `New*` structs carry the fields
//! supplied when a record is created.

pub mod click;
pub mod link;

pub use click::{CLICK_SLOT_SECONDS, Click, NewClick, SlotCount, SourceCount, slot_start};
pub use link::{Link, LinkTotals, NewLink};
