use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

// Storage keys
pub const USER_KEY: &str = "session-user";
pub const AUTH_TOKEN_KEY: &str = "session-auth-token";
pub const PREMIUM_PLAN_KEY: &str = "session-premium-plan";

// User representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: String,
	pub name: String,
	pub email: String,
}

impl User {
	pub fn new(id: &str, name: &str, email: &str) -> Self {
		User {
			id: id.to_string(),
			name: name.to_string(),
			email: email.to_string(),
		}
	}
}

/// Subscription tiers. The identifiers are the numeric plan values the
/// plans page has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PremiumPlan {
	Basic,
	Pro,
	Elite,
}

impl PremiumPlan {
	pub const ALL: [PremiumPlan; 3] = [PremiumPlan::Basic, PremiumPlan::Pro, PremiumPlan::Elite];

	/// Identifier written to durable storage.
	pub fn id(&self) -> &'static str {
		match self {
			PremiumPlan::Basic => "3",
			PremiumPlan::Pro => "4",
			PremiumPlan::Elite => "5",
		}
	}

	pub fn value(&self) -> u8 {
		match self {
			PremiumPlan::Basic => 3,
			PremiumPlan::Pro => 4,
			PremiumPlan::Elite => 5,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			PremiumPlan::Basic => "Basic",
			PremiumPlan::Pro => "Pro",
			PremiumPlan::Elite => "Elite",
		}
	}

	/// Parse a stored identifier (`"3"`, `"4"`, `"5"`).
	pub fn from_id(id: &str) -> Result<Self, SessionError> {
		match id.trim() {
			"3" => Ok(PremiumPlan::Basic),
			"4" => Ok(PremiumPlan::Pro),
			"5" => Ok(PremiumPlan::Elite),
			other => Err(SessionError::InvalidPlan(other.to_string())),
		}
	}
}

impl TryFrom<u8> for PremiumPlan {
	type Error = SessionError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		PremiumPlan::ALL
			.iter()
			.copied()
			.find(|plan| plan.value() == value)
			.ok_or_else(|| SessionError::InvalidPlan(value.to_string()))
	}
}

// Accepts either the identifier or the lowercase plan name
impl FromStr for PremiumPlan {
	type Err = SessionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"basic" => Ok(PremiumPlan::Basic),
			"pro" => Ok(PremiumPlan::Pro),
			"elite" => Ok(PremiumPlan::Elite),
			other => PremiumPlan::from_id(other),
		}
	}
}

impl fmt::Display for PremiumPlan {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// The in-memory session record for one running client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
	pub user: Option<User>,
	pub auth_token: Option<String>,
	pub selected_plan: Option<PremiumPlan>,
	pub is_premium_active: bool,
}

impl Session {
	/// Derived from `user`, never stored separately.
	pub fn is_authenticated(&self) -> bool {
		self.user.is_some()
	}

	/// The plan currently in effect, if one has been confirmed.
	pub fn active_plan(&self) -> Option<PremiumPlan> {
		if self.is_premium_active {
			self.selected_plan
		} else {
			None
		}
	}
}
