// utils/token.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, Error> {
    if user_id.is_empty() {
        return Err(Error::from(jsonwebtoken::errors::ErrorKind::InvalidSubject));
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(expires_in_seconds)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Returns the token's subject (the user id) when the signature and expiry
/// check out.
pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, Error> {
    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(decoded.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn round_trip_preserves_the_user_id() {
        let user_id = Uuid::new_v4().to_string();
        let secret = b"my-secret-key";

        let token = create_token(&user_id, secret, 60).unwrap();
        let decoded = decode_token(token, secret).unwrap();

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("some-user", b"secret-a", 60).unwrap();

        assert!(decode_token(token, b"secret-b").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("some-user", b"secret", -10).unwrap();

        assert!(decode_token(token, b"secret").is_err());
    }

    #[test]
    fn empty_subject_is_rejected() {
        assert!(create_token("", b"secret", 60).is_err());
    }
}
