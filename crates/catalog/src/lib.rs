//! `netbill-catalog` — plan and location rows.
//!
//! The catalog is managed out of band; the purchase core only reads plan
//! pricing/duration and checks that referenced rows exist.

pub mod location;
pub mod plan;

pub use location::Location;
pub use plan::Plan;
