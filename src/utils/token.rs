use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::session::models::User;

// Token Claims Structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	pub sub: String,         // User ID
	pub name: String,        // Display name
	pub email: String,       // Email address
	pub exp: usize,          // Expiration timestamp
	pub iat: usize,          // Issued at timestamp
	pub nbf: Option<usize>,  // Not valid before timestamp
	pub jti: Option<String>, // Unique token identifier
}

impl TokenClaims {
	pub fn user(&self) -> User {
		User::new(&self.sub, &self.name, &self.email)
	}
}

/// Token generator for signing session auth tokens
pub struct TokenGenerator {
	jwt_secret: String,
}

impl TokenGenerator {
	/// Create a new token generator
	pub fn new(jwt_secret: &str) -> Self {
		TokenGenerator {
			jwt_secret: jwt_secret.to_string(),
		}
	}

	/// Generate a token for a user, valid for `days_valid` days
	pub fn generate_token(&self, user: &User, days_valid: u64) -> Result<String> {
		let valid_for = i64::try_from(days_valid)
			.ok()
			.and_then(Duration::try_days)
			.ok_or_else(|| SessionError::Token(format!("validity of {} days is too long", days_valid)))?;
		self.issue(user, valid_for)
	}

	/// Generate a token that expires after `valid_for`
	pub fn issue(&self, user: &User, valid_for: Duration) -> Result<String> {
		let now = Utc::now();
		let expiration = now
			.checked_add_signed(valid_for)
			.ok_or_else(|| SessionError::Token("token expiry is out of range".to_string()))?;

		// Generate a unique token ID
		let token_id = format!("{:x}-{:x}", thread_rng().gen::<u64>(), now.timestamp());

		let claims = TokenClaims {
			sub: user.id.clone(),
			name: user.name.clone(),
			email: user.email.clone(),
			iat: now.timestamp().max(0) as usize,
			exp: expiration.timestamp().max(0) as usize,
			nbf: Some(now.timestamp().max(0) as usize),
			jti: Some(token_id),
		};

		let header = Header::new(Algorithm::HS256);
		let encoding_key = EncodingKey::from_secret(self.jwt_secret.as_bytes());

		let token = jsonwebtoken::encode(&header, &claims, &encoding_key)
			.map_err(|e| SessionError::Token(format!("Failed to generate token: {}", e)))?;

		debug!("Generated token for user {} with ID {}", user.name, user.id);
		Ok(token)
	}

	/// Check the signature and expiry of a token and return its claims
	pub fn verify(&self, token: &str) -> Result<TokenClaims> {
		let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());

		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = true;
		validation.validate_nbf = true;

		let token_data = jsonwebtoken::decode::<TokenClaims>(token.trim(), &decoding_key, &validation)
			.map_err(|e| SessionError::Token(format!("Token validation failed: {}", e)))?;

		Ok(token_data.claims)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn user() -> User {
		User::new("17", "Meera", "meera@example.com")
	}

	#[test]
	fn issued_token_verifies_with_same_secret() {
		let generator = TokenGenerator::new("secret-one");
		let token = generator.generate_token(&user(), 1).unwrap();

		let claims = generator.verify(&token).unwrap();
		assert_eq!(claims.user(), user());
		assert!(claims.exp > claims.iat);
		assert!(claims.jti.is_some());
	}

	#[test]
	fn token_rejected_with_other_secret() {
		let token = TokenGenerator::new("secret-one")
			.generate_token(&user(), 1)
			.unwrap();

		assert!(matches!(
			TokenGenerator::new("secret-two").verify(&token),
			Err(SessionError::Token(_))
		));
	}

	#[test]
	fn expired_token_rejected() {
		let generator = TokenGenerator::new("secret-one");
		let token = generator.issue(&user(), Duration::hours(-2)).unwrap();
		assert!(generator.verify(&token).is_err());
	}

	#[test]
	fn token_ids_are_unique() {
		let generator = TokenGenerator::new("secret-one");
		let a = generator.verify(&generator.generate_token(&user(), 1).unwrap()).unwrap();
		let b = generator.verify(&generator.generate_token(&user(), 1).unwrap()).unwrap();
		assert_ne!(a.jti, b.jti);
	}
}
