use models::errors::ModelError;
use models::user;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::blog::BlogService;
use crate::errors::ServiceError;

/// Sign-up form; passwords belong to the authentication provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl BlogService {
    async fn duplicate_reason(&self, form: &SignupForm) -> Result<Option<&'static str>, ServiceError> {
        if user::find_by_username(&self.db, &form.username).await?.is_some() {
            return Ok(Some("A user with that username already exists"));
        }
        if user::email_taken(&self.db, &form.email).await? {
            return Ok(Some("Email already exists"));
        }
        Ok(None)
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: SignupForm) -> Result<user::Model, ServiceError> {
        user::validate_username(&form.username)?;
        user::validate_email(&form.email)?;
        if let Some(reason) = self.duplicate_reason(&form).await? {
            return Err(ServiceError::Conflict(reason.into()));
        }
        let created = match user::create(&self.db, &form.username, &form.email, &form.first_name, &form.last_name).await {
            Ok(created) => created,
            // lost a race with a concurrent sign-up; report which field collided
            Err(ModelError::Conflict(_)) => {
                let reason = self.duplicate_reason(&form).await?.unwrap_or("Email already exists");
                return Err(ServiceError::Conflict(reason.into()));
            }
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %created.id, "user_signed_up");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{blog, log_test_case};

    fn form(username: &str, email: &str) -> SignupForm {
        SignupForm { username: username.into(), email: email.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn signup_creates_user() -> Result<(), anyhow::Error> {
        log_test_case("sign-up creates a user that can be looked up");
        let svc = blog().await?;
        let created = svc.signup(SignupForm { first_name: "Ivan".into(), ..form("ivan", "ivan@example.com") }).await?;
        let found = svc.user_by_username("ivan").await?;
        assert_eq!(found.id, created.id);
        assert_eq!(found.first_name, "Ivan");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() -> Result<(), anyhow::Error> {
        log_test_case("sign-up refuses an email that is already registered");
        let svc = blog().await?;
        svc.signup(form("first", "same@example.com")).await?;
        match svc.signup(form("second", "same@example.com")).await {
            Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "Email already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(matches!(svc.signup(form("first", "other@example.com")).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(svc.signup(form("third", "nope")).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_signups_with_same_email_conflict() -> Result<(), anyhow::Error> {
        log_test_case("two racing sign-ups for one email give one user and one conflict");
        let svc = blog().await?;
        let (a, b) = tokio::join!(
            svc.signup(form("racer_a", "race@example.com")),
            svc.signup(form("racer_b", "race@example.com")),
        );
        let conflicts: Vec<_> = [&a, &b]
            .into_iter()
            .filter_map(|r| match r {
                Err(ServiceError::Conflict(msg)) => Some(msg.clone()),
                _ => None,
            })
            .collect();
        assert_eq!([&a, &b].iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(conflicts, vec!["Email already exists".to_string()]);
        Ok(())
    }
}
