/// Authentication service - JWT and password handling
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use freetunes_core::{types::UserCredentials, UserId};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    pub token_type: TokenType,
    /// Unique token id so two tokens issued in the same second differ
    #[serde(default)]
    pub jti: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64, refresh_expiration_days: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (tests use the minimum)
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Lifetime of a refresh token; the refresh cookie expires with it
    pub fn refresh_token_lifetime(&self) -> Duration {
        self.refresh_token_expiration
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Access, self.access_token_expiration)
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: &UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Refresh, self.refresh_token_expiration)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Check a password against the stored hash, rejecting unverified accounts
    pub fn check_credentials(
        &self,
        password: &str,
        credentials: Option<&UserCredentials>,
    ) -> Result<UserId> {
        let credentials = credentials
            .ok_or_else(|| ServerError::Auth("Invalid credentials".to_string()))?;

        if !self.verify_password(password, &credentials.password_hash)? {
            return Err(ServerError::Auth("Invalid credentials".to_string()));
        }
        if !credentials.is_active {
            return Err(ServerError::Auth("Please verify your account first".to_string()));
        }

        Ok(credentials.id.clone())
    }

    /// Verify that a token is an access token
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    /// Verify that a token is a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }

    fn create_token(
        &self,
        user_id: &UserId,
        token_type: TokenType,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let auth = AuthService::new("secret".to_string(), 1, 30).with_bcrypt_cost(4);
        let password = "my_secure_password";

        let hash = auth.hash_password(password).unwrap();
        assert!(auth.verify_password(password, &hash).unwrap());
        assert!(!auth.verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_token_creation_and_verification() {
        let auth = AuthService::new("secret".to_string(), 1, 30);
        let user_id = UserId::new("user-123");

        let access_token = auth.create_access_token(&user_id).unwrap();
        let verified_id = auth.verify_access_token(&access_token).unwrap();
        assert_eq!(verified_id, user_id);

        let refresh_token = auth.create_refresh_token(&user_id).unwrap();
        let verified_id = auth.verify_refresh_token(&refresh_token).unwrap();
        assert_eq!(verified_id, user_id);

        let second = auth.create_refresh_token(&user_id).unwrap();
        assert_ne!(second, refresh_token);
    }

    #[test]
    fn test_check_credentials() {
        let auth = AuthService::new("secret".to_string(), 1, 30).with_bcrypt_cost(4);
        let credentials = UserCredentials {
            id: UserId::new("user-1"),
            password_hash: auth.hash_password("hunter22").unwrap(),
            is_active: true,
        };

        assert_eq!(
            auth.check_credentials("hunter22", Some(&credentials)).unwrap(),
            UserId::new("user-1")
        );
        assert!(matches!(
            auth.check_credentials("wrong", Some(&credentials)),
            Err(ServerError::Auth(_))
        ));
        assert!(matches!(
            auth.check_credentials("hunter22", None),
            Err(ServerError::Auth(_))
        ));

        let inactive = UserCredentials {
            is_active: false,
            ..credentials
        };
        assert!(matches!(
            auth.check_credentials("hunter22", Some(&inactive)),
            Err(ServerError::Auth(_))
        ));
    }

    #[test]
    fn test_token_type_validation() {
        let auth = AuthService::new("secret".to_string(), 1, 30);
        let user_id = UserId::new("user-123");

        let access_token = auth.create_access_token(&user_id).unwrap();
        assert!(auth.verify_refresh_token(&access_token).is_err());

        let refresh_token = auth.create_refresh_token(&user_id).unwrap();
        assert!(auth.verify_access_token(&refresh_token).is_err());
    }
}
