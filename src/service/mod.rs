//! Service layer: business logic orchestration.
//!
//! [`CatalogService`] materializes nested read models from join rows;
//! [`DonationService`] drives the ledger and emits events through the
//! [`super::domain::EventBus`].

pub mod catalog_service;
pub mod donation_service;

pub use catalog_service::CatalogService;
pub use donation_service::DonationService;
