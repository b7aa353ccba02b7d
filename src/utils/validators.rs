use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	/// Loose shape check used by the sign-up form
	static ref EMAIL_SHAPE_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_email_shaped(email: &str) -> bool {
	EMAIL_SHAPE_REGEX.is_match(email)
}

/// Sign-up rule: at least 6 characters mixing lowercase, uppercase and digits.
pub fn validate_signup_password(password: &str) -> bool {
	password.chars().count() >= 6
		&& password.chars().any(|c| c.is_ascii_lowercase())
		&& password.chars().any(|c| c.is_ascii_uppercase())
		&& password.chars().any(|c| c.is_ascii_digit())
}
