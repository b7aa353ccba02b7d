//! Local sign-in and sign-up flows.
//!
//! There is no account service behind these: a form that passes validation
//! produces a user record and a signed token, and the session store is
//! updated the same way a real login response would update it.

use chrono::Utc;
use log::{info, warn};

use crate::error::{Result, ValidationErrors};
use crate::session::models::{PremiumPlan, User};
use crate::session::store::SessionStore;
use crate::storage::backend::StorageBackend;
use crate::utils::token::TokenGenerator;
use crate::utils::validators::{is_email_shaped, validate_signup_password};

// Simulated sign-in always resolves to the same account id
const LOCAL_USER_ID: &str = "1";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
	pub email: String,
	pub password: String,
}

impl LoginForm {
	pub fn validate(&self) -> Result<()> {
		let mut errors = ValidationErrors::new();
		if self.email.trim().is_empty() || self.password.is_empty() {
			errors.add("general", "Please enter both email and password.");
		}
		errors.into_result()
	}
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
	pub full_name: String,
	pub email: String,
	pub password: String,
	pub confirm_password: String,
	pub agree_to_terms: bool,
	/// `None` is the free tier.
	pub plan: Option<PremiumPlan>,
}

impl RegistrationForm {
	pub fn validate(&self) -> Result<()> {
		let mut errors = ValidationErrors::new();

		let name = self.full_name.trim();
		if name.is_empty() {
			errors.add("full_name", "Full name is required");
		} else if name.chars().count() < 2 {
			errors.add("full_name", "Name must be at least 2 characters");
		}

		if self.email.is_empty() {
			errors.add("email", "Email is required");
		} else if !is_email_shaped(&self.email) {
			errors.add("email", "Enter a valid email address");
		}

		if self.password.is_empty() {
			errors.add("password", "Password is required");
		} else if self.password.chars().count() < 6 {
			errors.add("password", "Password must be at least 6 characters");
		} else if !validate_signup_password(&self.password) {
			errors.add("password", "Password must contain uppercase, lowercase, and number");
		}

		if self.confirm_password.is_empty() {
			errors.add("confirm_password", "Please confirm your password");
		} else if self.password != self.confirm_password {
			errors.add("confirm_password", "Passwords do not match");
		}

		if !self.agree_to_terms {
			errors.add("agree_to_terms", "You must agree to the Terms");
		}

		errors.into_result()
	}
}

pub struct Authenticator {
	tokens: TokenGenerator,
	token_days: u64,
}

impl Authenticator {
	pub fn new(tokens: TokenGenerator, token_days: u64) -> Self {
		Authenticator { tokens, token_days }
	}

	pub fn login<B: StorageBackend>(&self, store: &mut SessionStore<B>, form: &LoginForm) -> Result<User> {
		if let Err(e) = form.validate() {
			warn!("Login rejected: {}", e);
			return Err(e);
		}

		let email = form.email.trim();
		let name = email.split('@').next().unwrap_or(email);
		let user = User::new(LOCAL_USER_ID, name, email);

		let token = self.tokens.generate_token(&user, self.token_days)?;
		store.login(user.clone(), token);
		Ok(user)
	}

	/// Create the account, sign in, and activate the chosen paid plan.
	pub fn register<B: StorageBackend>(
		&self,
		store: &mut SessionStore<B>,
		form: &RegistrationForm,
	) -> Result<User> {
		if let Err(e) = form.validate() {
			warn!("Registration rejected: {}", e);
			return Err(e);
		}

		let id = Utc::now().timestamp_millis().to_string();
		let user = User::new(&id, form.full_name.trim(), &form.email);

		let token = self.tokens.generate_token(&user, self.token_days)?;
		store.login(user.clone(), token);

		if let Some(plan) = form.plan {
			store.subscribe(plan);
		}

		info!("Registered {} ({})", user.name, user.id);
		Ok(user)
	}
}
