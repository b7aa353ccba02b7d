//! Pure session state transitions.
//!
//! `apply` computes the next session and the storage writes that must follow
//! it. Nothing here touches storage, so every transition can be checked on
//! its own.

use crate::session::models::{PremiumPlan, Session, User, AUTH_TOKEN_KEY, PREMIUM_PLAN_KEY, USER_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Login { user: User, token: String },
	Logout,
	SetPlan(PremiumPlan),
	ConfirmPlan,
}

/// A durable write produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEffect {
	Put { key: &'static str, value: String },
	/// Serialised as JSON before it is written.
	PutUser { key: &'static str, user: User },
	Remove { key: &'static str },
}

impl StorageEffect {
	pub fn key(&self) -> &'static str {
		match self {
			StorageEffect::Put { key, .. } => *key,
			StorageEffect::PutUser { key, .. } => *key,
			StorageEffect::Remove { key } => *key,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
	pub next: Session,
	pub effects: Vec<StorageEffect>,
}

impl Transition {
	fn unchanged(session: &Session) -> Self {
		Transition {
			next: session.clone(),
			effects: Vec::new(),
		}
	}

	pub fn is_noop(&self) -> bool {
		self.effects.is_empty()
	}
}

pub fn apply(session: &Session, action: Action) -> Transition {
	match action {
		Action::Login { user, token } => Transition {
			next: Session {
				user: Some(user.clone()),
				auth_token: Some(token.clone()),
				..session.clone()
			},
			effects: vec![
				StorageEffect::PutUser { key: USER_KEY, user },
				StorageEffect::Put {
					key: AUTH_TOKEN_KEY,
					value: token,
				},
			],
		},
		// Premium state is left as it is
		Action::Logout => Transition {
			next: Session {
				user: None,
				auth_token: None,
				..session.clone()
			},
			effects: vec![
				StorageEffect::Remove { key: USER_KEY },
				StorageEffect::Remove { key: AUTH_TOKEN_KEY },
			],
		},
		// Switching plans always deactivates premium until confirmed again,
		// including across a reload.
		Action::SetPlan(plan) => Transition {
			next: Session {
				selected_plan: Some(plan),
				is_premium_active: false,
				..session.clone()
			},
			effects: vec![StorageEffect::Remove { key: PREMIUM_PLAN_KEY }],
		},
		Action::ConfirmPlan => match session.selected_plan {
			Some(plan) => Transition {
				next: Session {
					is_premium_active: true,
					..session.clone()
				},
				effects: vec![StorageEffect::Put {
					key: PREMIUM_PLAN_KEY,
					value: plan.id().to_string(),
				}],
			},
			None => Transition::unchanged(session),
		},
	}
}
