use crate::domain::user::UserId;
use crate::error::{MarketError, Result};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "procura_session";
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

/// Signs and checks stateless session tokens: `<user id>.<expires unix>.<hex hmac>`.
///
/// The token only proves identity; role and status are reloaded from the
/// store on every request.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
    max_age: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref().to_vec();
        if secret.is_empty() {
            return Err(MarketError::Internal(
                "session secret must not be empty".into(),
            ));
        }
        Ok(Self {
            secret,
            max_age: Duration::days(SESSION_MAX_AGE_DAYS),
        })
    }

    /// A signer with a random secret; sessions die with the process.
    pub fn ephemeral() -> Self {
        let secret: [u8; 32] = rand::random();
        Self {
            secret: secret.to_vec(),
            max_age: Duration::days(SESSION_MAX_AGE_DAYS),
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|e| {
            error!(error = %e, "session key rejected");
            MarketError::Internal("Failed to sign session".into())
        })?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<SessionToken> {
        let expires_at = now + self.max_age;
        let payload = format!("{}.{}", user_id, expires_at.timestamp());
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());
        Ok(SessionToken {
            token: format!("{payload}.{signature}"),
            expires_at,
        })
    }

    /// Returns the user id of a well-signed, unexpired token.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId> {
        let (payload, signature) = token.rsplit_once('.').ok_or(MarketError::Unauthorized)?;
        let signature = hex::decode(signature).map_err(|_| MarketError::Unauthorized)?;
        self.mac(payload)?
            .verify_slice(&signature)
            .map_err(|_| MarketError::Unauthorized)?;

        let (user_id, expires) = payload.split_once('.').ok_or(MarketError::Unauthorized)?;
        let expires: i64 = expires.parse().map_err(|_| MarketError::Unauthorized)?;
        if expires <= now.timestamp() {
            return Err(MarketError::Unauthorized);
        }
        user_id.parse().map_err(|_| MarketError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_issue_and_verify() {
        let signer = SessionSigner::new("secret").unwrap();
        let user = Uuid::new_v4();
        let now = Utc::now();
        let session = signer.issue(user, now).unwrap();
        assert_eq!(session.expires_at, now + Duration::days(30));
        assert_eq!(signer.verify(&session.token, now).unwrap(), user);
    }

    #[test]
    fn test_rejects_tampering_and_foreign_secret() {
        let signer = SessionSigner::new("secret").unwrap();
        let now = Utc::now();
        let session = signer.issue(Uuid::new_v4(), now).unwrap();

        let mut forged = session.token.clone();
        let last = forged.pop().unwrap();
        forged.push(if last == '0' { '1' } else { '0' });
        assert!(matches!(
            signer.verify(&forged, now),
            Err(MarketError::Unauthorized)
        ));

        let other = SessionSigner::new("other").unwrap();
        assert!(other.verify(&session.token, now).is_err());
        assert!(signer.verify("garbage", now).is_err());
        assert!(signer.verify("a.b.zz", now).is_err());
    }

    #[test]
    fn test_rejects_expired() {
        let signer = SessionSigner::ephemeral();
        let issued = Utc::now() - Duration::days(31);
        let session = signer.issue(Uuid::new_v4(), issued).unwrap();
        assert!(matches!(
            signer.verify(&session.token, Utc::now()),
            Err(MarketError::Unauthorized)
        ));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(SessionSigner::new("").is_err());
    }
}
