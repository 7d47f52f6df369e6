//! Service layer: business rules and read models.
//!
//! [`RegistrationService`] owns the register/cancel decisions;
//! [`QueryService`] owns event creation and every read. Both hold only an
//! `Arc<dyn RegistrationStore>`.

pub mod query_service;
pub mod registration_service;

pub use query_service::QueryService;
pub use registration_service::RegistrationService;
