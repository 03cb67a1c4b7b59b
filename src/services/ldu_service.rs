use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthContext, MAINTAIN_REF_DATA, SYSTEM_USER};
use crate::database::models::{LocalDeliveryUnit, ProbationTeam};
use crate::database::repository::{LduStore, StoreError};
use crate::services::validation::{self, ValidationError};

/// Result of a set-mailbox operation. These are expected branches of normal
/// operation, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Created,
    Updated,
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Access is denied")]
    AccessDenied,

    #[error(transparent)]
    Store(#[from] StoreError),
}

const MAINTAINER_ROLES: &[&str] = &[MAINTAIN_REF_DATA, SYSTEM_USER];

/// Set/delete semantics for LDU and team functional mailboxes over a
/// persistence seam. Reads are open; writes require a maintainer role,
/// checked before input validation, which in turn runs before any lookup.
#[derive(Clone)]
pub struct LocalDeliveryUnitService {
    store: Arc<dyn LduStore>,
}

impl LocalDeliveryUnitService {
    pub fn new(store: Arc<dyn LduStore>) -> Self {
        Self { store }
    }

    pub async fn probation_area_codes(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.probation_area_codes().await?)
    }

    pub async fn local_delivery_units(&self) -> Result<Vec<LocalDeliveryUnit>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn probation_area(
        &self,
        probation_area_code: &str,
    ) -> Result<Vec<LocalDeliveryUnit>, ServiceError> {
        Ok(self
            .store
            .find_by_probation_area_code(probation_area_code)
            .await?)
    }

    pub async fn local_delivery_unit(
        &self,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
    ) -> Result<Option<LocalDeliveryUnit>, ServiceError> {
        Ok(self
            .store
            .find_by_codes(probation_area_code, local_delivery_unit_code)
            .await?)
    }

    pub async fn set_functional_mailbox(
        &self,
        auth: &AuthContext,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
        proposed_functional_mailbox: &str,
    ) -> Result<SetOutcome, ServiceError> {
        require_maintainer(auth)?;
        validation::probation_area_code(probation_area_code)?;
        validation::local_delivery_unit_code(local_delivery_unit_code)?;
        validation::email(proposed_functional_mailbox)?;

        match self
            .store
            .find_by_codes(probation_area_code, local_delivery_unit_code)
            .await?
        {
            Some(mut ldu) => match ldu.functional_mailbox.as_deref() {
                None => {
                    ldu.functional_mailbox = Some(proposed_functional_mailbox.to_string());
                    self.store.save(&ldu, &auth.principal).await?;
                    Ok(SetOutcome::Created)
                }
                Some(current) if current == proposed_functional_mailbox => Ok(SetOutcome::NoChange),
                Some(_) => {
                    ldu.functional_mailbox = Some(proposed_functional_mailbox.to_string());
                    self.store.save(&ldu, &auth.principal).await?;
                    Ok(SetOutcome::Updated)
                }
            },
            None => {
                let mut ldu = LocalDeliveryUnit::new(probation_area_code, local_delivery_unit_code);
                ldu.functional_mailbox = Some(proposed_functional_mailbox.to_string());
                self.store.save(&ldu, &auth.principal).await?;
                Ok(SetOutcome::Created)
            }
        }
    }

    pub async fn set_team_functional_mailbox(
        &self,
        auth: &AuthContext,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
        team_code: &str,
        proposed_functional_mailbox: &str,
    ) -> Result<SetOutcome, ServiceError> {
        require_maintainer(auth)?;
        validation::probation_area_code(probation_area_code)?;
        validation::local_delivery_unit_code(local_delivery_unit_code)?;
        validation::team_code(team_code)?;
        validation::email(proposed_functional_mailbox)?;

        let team = ProbationTeam {
            functional_mailbox: proposed_functional_mailbox.to_string(),
        };

        match self
            .store
            .find_by_codes(probation_area_code, local_delivery_unit_code)
            .await?
        {
            Some(mut ldu) => {
                // An existing team is overwritten unconditionally: no equality
                // short-circuit here, unlike the LDU-level mailbox.
                let outcome = if ldu.probation_teams.contains_key(team_code) {
                    SetOutcome::Updated
                } else {
                    SetOutcome::Created
                };
                ldu.probation_teams.insert(team_code.to_string(), team);
                self.store.save(&ldu, &auth.principal).await?;
                Ok(outcome)
            }
            None => {
                let mut ldu = LocalDeliveryUnit::new(probation_area_code, local_delivery_unit_code);
                ldu.probation_teams.insert(team_code.to_string(), team);
                self.store.save(&ldu, &auth.principal).await?;
                Ok(SetOutcome::Created)
            }
        }
    }

    pub async fn delete_functional_mailbox(
        &self,
        auth: &AuthContext,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
    ) -> Result<DeleteOutcome, ServiceError> {
        require_maintainer(auth)?;
        validation::probation_area_code(probation_area_code)?;
        validation::local_delivery_unit_code(local_delivery_unit_code)?;

        let ldu = match self
            .store
            .find_by_codes(probation_area_code, local_delivery_unit_code)
            .await?
        {
            Some(ldu) => ldu,
            None => return Ok(DeleteOutcome::NotFound),
        };

        if ldu.functional_mailbox.is_none() {
            // Nothing to delete, even when teams exist.
            return Ok(DeleteOutcome::NotFound);
        }

        if ldu.probation_teams.is_empty() {
            self.store.delete(ldu.id).await?;
        } else {
            let mut ldu = ldu;
            ldu.functional_mailbox = None;
            self.store.save(&ldu, &auth.principal).await?;
        }
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn delete_team_functional_mailbox(
        &self,
        auth: &AuthContext,
        probation_area_code: &str,
        local_delivery_unit_code: &str,
        team_code: &str,
    ) -> Result<DeleteOutcome, ServiceError> {
        require_maintainer(auth)?;
        validation::probation_area_code(probation_area_code)?;
        validation::local_delivery_unit_code(local_delivery_unit_code)?;
        validation::team_code(team_code)?;

        let mut ldu = match self
            .store
            .find_by_codes(probation_area_code, local_delivery_unit_code)
            .await?
        {
            Some(ldu) => ldu,
            None => return Ok(DeleteOutcome::NotFound),
        };

        if ldu.probation_teams.remove(team_code).is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        if ldu.probation_teams.is_empty() && ldu.functional_mailbox.is_none() {
            self.store.delete(ldu.id).await?;
        } else {
            self.store.save(&ldu, &auth.principal).await?;
        }
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}

fn require_maintainer(auth: &AuthContext) -> Result<(), ServiceError> {
    if auth.has_any_role(MAINTAINER_ROLES) {
        Ok(())
    } else {
        Err(ServiceError::AccessDenied)
    }
}
