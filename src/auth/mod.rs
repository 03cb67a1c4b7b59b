use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;

pub const MAINTAIN_REF_DATA: &str = "MAINTAIN_REF_DATA";
pub const SYSTEM_USER: &str = "SYSTEM_USER";
pub const VIEW_PROBATION_TEAMS: &str = "VIEW_PROBATION_TEAMS";

pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Claims of interest from the auth server's access tokens. Machine clients
/// carry `client_id` but no `user_name`.
#[derive(Debug, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Custom claim: granted role names, already `ROLE_` prefixed.
    #[serde(default)]
    pub authorities: Vec<String>,
    #[serde(default)]
    pub scope: Option<ScopeClaim>,
    pub exp: i64,
}

/// The `scope` claim appears as either a list or a space-delimited string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    List(Vec<String>),
    Delimited(String),
}

impl ScopeClaim {
    fn into_scopes(self) -> Vec<String> {
        match self {
            ScopeClaim::List(scopes) => scopes,
            ScopeClaim::Delimited(s) => s.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Per-request identity: resolved once by the auth middleware and passed
/// explicitly into every operation that needs it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: String,
    authorities: HashSet<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            principal: ANONYMOUS_PRINCIPAL.to_string(),
            authorities: HashSet::new(),
        }
    }

    pub fn from_claims(claims: Claims) -> Self {
        let principal = claims
            .user_name
            .or(claims.client_id)
            .unwrap_or_else(|| ANONYMOUS_PRINCIPAL.to_string());

        let mut authorities: HashSet<String> = claims.authorities.into_iter().collect();
        if let Some(scope) = claims.scope {
            // Standard scopes become SCOPE_ authorities; they never satisfy a
            // role check but are kept for parity with the token contents.
            authorities.extend(scope.into_scopes().into_iter().map(|s| format!("SCOPE_{s}")));
        }

        Self { principal, authorities }
    }

    /// Case-sensitive check of the unprefixed logical role name.
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities.contains(&format!("ROLE_{role}"))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

/// Verifies RS256 bearer tokens against the configured public key. With no
/// key configured every token resolves to the anonymous context.
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_public_key_pem(pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self {
            key: Some(key),
            validation: Self::validation(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            key: None,
            validation: Self::validation(),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        validation
    }

    /// None on any failure: the caller falls back to the anonymous context.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let key = self.key.as_ref()?;
        match decode::<Claims>(token, key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_name: Option<&str>, client_id: Option<&str>, authorities: &[&str]) -> Claims {
        Claims {
            user_name: user_name.map(str::to_string),
            client_id: client_id.map(str::to_string),
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
            scope: None,
            exp: 0,
        }
    }

    #[test]
    fn principal_prefers_user_name() {
        let ctx = AuthContext::from_claims(claims(Some("API_TEST_USER"), Some("client"), &[]));
        assert_eq!(ctx.principal, "API_TEST_USER");
    }

    #[test]
    fn principal_falls_back_to_client_id() {
        let ctx = AuthContext::from_claims(claims(None, Some("delius"), &[]));
        assert_eq!(ctx.principal, "delius");
    }

    #[test]
    fn principal_defaults_to_anonymous() {
        let ctx = AuthContext::from_claims(claims(None, None, &[]));
        assert_eq!(ctx.principal, ANONYMOUS_PRINCIPAL);
    }

    #[test]
    fn role_check_requires_role_prefix() {
        let ctx = AuthContext::from_claims(claims(Some("u"), None, &["ROLE_SYSTEM_USER"]));
        assert!(ctx.has_role(SYSTEM_USER));
        assert!(!ctx.has_role(MAINTAIN_REF_DATA));
        assert!(ctx.has_any_role(&[MAINTAIN_REF_DATA, SYSTEM_USER]));
    }

    #[test]
    fn role_check_is_case_sensitive() {
        let ctx = AuthContext::from_claims(claims(Some("u"), None, &["ROLE_system_user"]));
        assert!(!ctx.has_role(SYSTEM_USER));
    }

    #[test]
    fn scopes_do_not_satisfy_role_checks() {
        let mut c = claims(Some("u"), None, &[]);
        c.scope = Some(ScopeClaim::Delimited("read write".to_string()));
        let ctx = AuthContext::from_claims(c);
        assert!(!ctx.has_role("read"));
        assert!(!ctx.has_any_role(&[MAINTAIN_REF_DATA, SYSTEM_USER]));
    }

    #[test]
    fn anonymous_has_no_roles() {
        let ctx = AuthContext::anonymous();
        assert!(!ctx.has_any_role(&[MAINTAIN_REF_DATA, SYSTEM_USER, VIEW_PROBATION_TEAMS]));
    }

    #[test]
    fn disabled_verifier_rejects_everything() {
        assert!(TokenVerifier::disabled().decode("not-a-token").is_none());
    }
}
