//! Domain layer: events, users, capacity and registration statistics.
//!
//! These types carry no I/O. Registrations themselves are not modelled as
//! a struct: a registration is the existence of an `(EventId, UserId)` pair
//! in the store, and its count is always derived, never stored.

pub mod capacity;
pub mod event;
pub mod ids;
pub mod stats;
pub mod user;

pub use capacity::Capacity;
pub use event::{Event, EventWithRoster, NewEvent, RosterEntry};
pub use ids::{EventId, UserId};
pub use stats::EventStats;
pub use user::User;
