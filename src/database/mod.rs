pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{LocalDeliveryUnit, ProbationTeam};
pub use repository::{LduStore, PgLduStore, StoreError};
