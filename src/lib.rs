//! # event-registry
//!
//! REST service for publishing events with a fixed capacity and letting
//! users register or cancel.
//!
//! The invariants live in the registration path: an event is never
//! over-booked, a user is never registered twice for the same event, and
//! past events refuse registrations. They hold across any number of
//! service instances because the final check-and-insert is a single
//! atomic unit in the store, not an in-process lock.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── API-key gate + REST Handlers (api/)
//!     │
//!     ├── RegistrationService / QueryService (service/)
//!     │
//!     ├── Domain types (domain/)
//!     │
//!     └── RegistrationStore (persistence/)
//!           ├── PostgreSQL (row lock + unique key)
//!           └── In-memory (single mutex)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
