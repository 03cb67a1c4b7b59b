pub mod local_delivery_unit;

pub use local_delivery_unit::{LocalDeliveryUnit, ProbationTeam};
