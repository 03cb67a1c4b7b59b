use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// An LDU aggregate: the parent row plus its owned probation teams, keyed by
/// team code. A row only exists while it has a functional mailbox or at least
/// one team; the service deletes it the moment both are gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalDeliveryUnit {
    pub id: Uuid,
    pub probation_area_code: String,
    pub local_delivery_unit_code: String,
    pub functional_mailbox: Option<String>,
    pub probation_teams: BTreeMap<String, ProbationTeam>,
    pub create_date_time: Option<DateTime<Utc>>,
    pub create_user_id: Option<String>,
    pub modify_date_time: Option<DateTime<Utc>>,
    pub modify_user_id: Option<String>,
}

/// Value object owned by exactly one LDU; no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbationTeam {
    pub functional_mailbox: String,
}

impl LocalDeliveryUnit {
    /// Fresh aggregate with a new surrogate id and no teams. Audit fields are
    /// stamped by the store on save.
    pub fn new(probation_area_code: &str, local_delivery_unit_code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            probation_area_code: probation_area_code.to_string(),
            local_delivery_unit_code: local_delivery_unit_code.to_string(),
            functional_mailbox: None,
            probation_teams: BTreeMap::new(),
            create_date_time: None,
            create_user_id: None,
            modify_date_time: None,
            modify_user_id: None,
        }
    }
}
