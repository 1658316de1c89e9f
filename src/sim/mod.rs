//! Deterministic belt simulation
//!
//! Pure data and stepping logic, no threads:
//! - Fixed timestep only
//! - Stable iteration order (by item ID)
//! - No rendering or platform dependencies

pub mod belt;
pub mod item;
pub mod snapshot;

pub use belt::{Belt, LaneGeometry, sanitize_speed};
pub use item::{Item, ItemId};
pub use snapshot::{ItemGroup, LaneSnapshot};
