use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Buyer,
    Supplier,
    Admin,
    Finance,
}

impl UserRole {
    /// Roles a visitor may pick for themselves at sign-up.
    pub fn is_self_service(&self) -> bool {
        matches!(self, UserRole::Buyer | UserRole::Supplier)
    }

    /// Roles that see every order, invoice and payment.
    pub fn sees_everything(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Finance)
    }
}

impl std::str::FromStr for UserRole {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUYER" => Ok(UserRole::Buyer),
            "SUPPLIER" => Ok(UserRole::Supplier),
            "ADMIN" => Ok(UserRole::Admin),
            "FINANCE" => Ok(UserRole::Finance),
            other => Err(MarketError::validation(format!("Unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Active,
    Suspended,
}

/// Admin dashboard actions on an account.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UserAction {
    Approve,
    Suspend,
    Activate,
}

impl UserAction {
    pub fn resulting_status(&self) -> UserStatus {
        match self {
            UserAction::Approve | UserAction::Activate => UserStatus::Active,
            UserAction::Suspend => UserStatus::Suspended,
        }
    }
}

impl std::str::FromStr for UserAction {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(UserAction::Approve),
            "suspend" => Ok(UserAction::Suspend),
            "activate" => Ok(UserAction::Activate),
            _ => Err(MarketError::validation("Invalid action")),
        }
    }
}

/// A marketplace account.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// bcrypt hash. Accounts provisioned by catalog import have none.
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_active: bool,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: &str, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email: normalize_email(email),
            password_hash: None,
            role,
            status: match role {
                UserRole::Supplier => UserStatus::Pending,
                _ => UserStatus::Active,
            },
            is_active: true,
            company: None,
            phone: None,
            address: None,
            city: None,
            country: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_sign_in(&self) -> bool {
        self.password_hash.is_some() && self.is_active && self.status != UserStatus::Suspended
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(city) = update.city {
            self.city = Some(city);
        }
        if let Some(country) = update.country {
            self.country = Some(country);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            is_active: self.is_active,
            company: self.company.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The account as returned over the API; never carries the password hash.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub is_active: bool,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Supplier or buyer summary embedded in products and orders.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
}

impl From<&User> for PartySummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            company: user.company.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub role: UserRole,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl Registration {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::validation("Name is required"));
        }
        if !is_plausible_email(&self.email) {
            return Err(MarketError::validation("Invalid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MarketError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.password != self.confirm_password {
            return Err(MarketError::validation("Passwords don't match"));
        }
        if !self.role.is_self_service() {
            return Err(MarketError::validation("Role cannot be self-assigned"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            name: "Ada Obi".to_string(),
            email: "Ada@Example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            role: UserRole::Buyer,
            company: None,
            phone: None,
        }
    }

    #[test]
    fn test_registration_valid() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_rejects_mismatched_passwords() {
        let mut r = registration();
        r.confirm_password = "password124".to_string();
        assert!(matches!(r.validate(), Err(MarketError::Validation(_))));
    }

    #[test]
    fn test_registration_rejects_short_password() {
        let mut r = registration();
        r.password = "short".to_string();
        r.confirm_password = "short".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_registration_rejects_privileged_roles() {
        let mut r = registration();
        r.role = UserRole::Admin;
        assert!(r.validate().is_err());
        r.role = UserRole::Finance;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_email_checks() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@@b.co"));
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_new_supplier_awaits_approval() {
        let supplier = User::new("Acme".into(), "sales@acme.ng", UserRole::Supplier);
        assert_eq!(supplier.status, UserStatus::Pending);
        let buyer = User::new("Ada".into(), "ada@example.com", UserRole::Buyer);
        assert_eq!(buyer.status, UserStatus::Active);
    }

    #[test]
    fn test_sign_in_requires_password_and_active_account() {
        let mut user = User::new("Ada".into(), "ada@example.com", UserRole::Buyer);
        assert!(!user.can_sign_in());
        user.password_hash = Some("hash".into());
        assert!(user.can_sign_in());
        user.set_status(UserStatus::Suspended);
        assert!(!user.can_sign_in());
        user.set_status(UserStatus::Active);
        user.is_active = false;
        assert!(!user.can_sign_in());
    }

    #[test]
    fn test_user_actions() {
        assert_eq!(
            "approve".parse::<UserAction>().unwrap().resulting_status(),
            UserStatus::Active
        );
        assert_eq!(
            "suspend".parse::<UserAction>().unwrap().resulting_status(),
            UserStatus::Suspended
        );
        assert!("delete".parse::<UserAction>().is_err());
    }

    #[test]
    fn test_view_hides_password() {
        let mut user = User::new("Ada".into(), "ada@example.com", UserRole::Buyer);
        user.password_hash = Some("secret-hash".into());
        let json = serde_json::to_string(&user.view()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"BUYER\""));
    }
}
