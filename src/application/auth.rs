use super::marketplace::{Marketplace, Principal};
use crate::domain::user::{Registration, User, UserStatus, UserView};
use crate::error::{MarketError, Result};
use crate::infrastructure::session::SessionToken;
use chrono::Utc;
use tracing::{info, warn};

impl Marketplace {
    /// Creates a self-service account. Suppliers wait for admin approval.
    pub async fn register(&self, registration: Registration) -> Result<UserView> {
        registration.validate()?;

        let mut user = User::new(
            registration.name.trim().to_string(),
            &registration.email,
            registration.role,
        );
        user.company = registration.company;
        user.phone = registration.phone;
        user.password_hash = Some(self.passwords.hash(&registration.password).await?);

        if !self.stores.users.insert(user.clone()).await? {
            return Err(MarketError::validation(
                "User with this email already exists",
            ));
        }
        info!(user_id = %user.id, role = ?user.role, "registered user");
        Ok(user.view())
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown accounts and wrong passwords are indistinguishable (401);
    /// deactivated or suspended accounts with the right password get 403.
    pub async fn login(&self, email: &str, password: &str) -> Result<(UserView, SessionToken)> {
        let user = self
            .stores
            .users
            .find_by_email(email)
            .await?
            .ok_or(MarketError::Unauthorized)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(MarketError::Unauthorized)?;
        if !self.passwords.verify(password, hash).await? {
            warn!(user_id = %user.id, "rejected login");
            return Err(MarketError::Unauthorized);
        }
        if !user.can_sign_in() {
            return Err(MarketError::Forbidden);
        }

        let session = self.sessions.issue(user.id, Utc::now())?;
        info!(user_id = %user.id, "signed in");
        Ok((user.view(), session))
    }

    /// Resolves a session token to the current state of its user.
    pub async fn authenticate(&self, token: &str) -> Result<Principal> {
        let user_id = self.sessions.verify(token, Utc::now())?;
        let user = self
            .stores
            .users
            .get(user_id)
            .await?
            .ok_or(MarketError::Unauthorized)?;
        if !user.is_active || user.status == UserStatus::Suspended {
            return Err(MarketError::Unauthorized);
        }
        Ok(Principal { user })
    }
}
