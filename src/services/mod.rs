pub mod ldu_service;
pub mod validation;

pub use ldu_service::{DeleteOutcome, LocalDeliveryUnitService, SetOutcome};
