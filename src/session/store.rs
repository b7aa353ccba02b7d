use log::{debug, info, warn};

use crate::session::models::{PremiumPlan, Session, User, AUTH_TOKEN_KEY, PREMIUM_PLAN_KEY, USER_KEY};
use crate::session::transition::{self, Action};
use crate::storage::backend::StorageBackend;
use crate::storage::mirror::DurableMirror;

/// Owner of the in-memory session, written through to a durable mirror.
///
/// The only way to obtain a store is [`SessionStore::hydrate`], so the
/// stored session is always read before the first action is accepted.
pub struct SessionStore<B: StorageBackend> {
	session: Session,
	mirror: DurableMirror<B>,
}

impl<B: StorageBackend> SessionStore<B> {
	/// Build the store from whatever the mirror holds.
	///
	/// Malformed entries are removed and ignored; the session starts empty
	/// for that part.
	pub fn hydrate(mirror: DurableMirror<B>) -> Self {
		let mut session = Session::default();

		session.user = mirror.load::<User>(USER_KEY);

		let token = mirror.get(AUTH_TOKEN_KEY);
		match (&session.user, token) {
			(Some(_), Some(token)) => session.auth_token = Some(token),
			(Some(user), None) => {
				warn!("Restored user {} without an auth token", user.id);
			}
			(None, Some(_)) => {
				warn!("Removing auth token stored without a user");
				mirror.remove(AUTH_TOKEN_KEY);
			}
			(None, None) => {}
		}

		if let Some(stored) = mirror.get(PREMIUM_PLAN_KEY) {
			match PremiumPlan::from_id(&stored) {
				Ok(plan) => {
					// Only a confirmation writes this key
					session.selected_plan = Some(plan);
					session.is_premium_active = true;
				}
				Err(e) => {
					warn!("Discarding stored premium plan: {}", e);
					mirror.remove(PREMIUM_PLAN_KEY);
				}
			}
		}

		info!(
			"Session hydrated: authenticated={}, plan={}, premium_active={}",
			session.is_authenticated(),
			session
				.selected_plan
				.map(|p| p.name())
				.unwrap_or("none"),
			session.is_premium_active
		);

		SessionStore { session, mirror }
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn is_authenticated(&self) -> bool {
		self.session.is_authenticated()
	}

	pub fn mirror(&self) -> &DurableMirror<B> {
		&self.mirror
	}

	/// Give up the store and hand back its mirror, e.g. to hydrate again.
	pub fn into_mirror(self) -> DurableMirror<B> {
		self.mirror
	}

	pub fn login(&mut self, user: User, token: String) {
		info!("User logged in: {} ({})", user.name, user.id);
		self.dispatch(Action::Login { user, token });
	}

	pub fn logout(&mut self) {
		if let Some(user) = &self.session.user {
			info!("User logged out: {} ({})", user.name, user.id);
		}
		self.dispatch(Action::Logout);
	}

	pub fn set_plan(&mut self, plan: PremiumPlan) {
		debug!("Selected plan {}", plan);
		self.dispatch(Action::SetPlan(plan));
	}

	/// Activate the selected plan. Returns `false` and changes nothing when
	/// no plan has been selected.
	pub fn confirm_plan(&mut self) -> bool {
		if !self.dispatch(Action::ConfirmPlan) {
			debug!("Plan confirmation ignored: no plan selected");
			return false;
		}

		if let Some(plan) = self.session.selected_plan {
			info!("Premium plan {} activated", plan);
		}
		true
	}

	/// Select and confirm in one step.
	pub fn subscribe(&mut self, plan: PremiumPlan) {
		self.set_plan(plan);
		self.confirm_plan();
	}

	// Returns whether the action changed anything
	fn dispatch(&mut self, action: Action) -> bool {
		let transition = transition::apply(&self.session, action);
		if transition.is_noop() {
			return false;
		}

		let expected = transition.effects.len();
		self.session = transition.next;

		let written = self.mirror.apply(&transition.effects);
		if written < expected {
			warn!(
				"Only {} of {} durable writes succeeded; session kept in memory",
				written, expected
			);
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::backend::MemoryBackend;

	fn store(backend: &MemoryBackend) -> SessionStore<MemoryBackend> {
		SessionStore::hydrate(DurableMirror::new(backend.clone()))
	}

	fn reload(store: SessionStore<MemoryBackend>) -> SessionStore<MemoryBackend> {
		SessionStore::hydrate(store.into_mirror())
	}

	fn user() -> User {
		User::new("1", "asha", "asha@example.com")
	}

	#[test]
	fn empty_storage_hydrates_empty_session() {
		let store = store(&MemoryBackend::new());
		assert_eq!(store.session(), &Session::default());
		assert!(!store.is_authenticated());
	}

	#[test]
	fn set_plan_reads_back_immediately() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);

		for plan in PremiumPlan::ALL {
			store.set_plan(plan);
			assert_eq!(store.session().selected_plan, Some(plan));
			assert!(!store.session().is_premium_active);
		}
	}

	#[test]
	fn confirm_without_selection_changes_nothing() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);

		assert!(!store.confirm_plan());
		assert_eq!(store.session(), &Session::default());
		assert!(backend.snapshot().is_empty());
	}

	#[test]
	fn plan_switch_scenario() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);

		store.set_plan(PremiumPlan::Pro);
		assert_eq!(store.session().selected_plan, Some(PremiumPlan::Pro));
		assert!(!store.session().is_premium_active);

		assert!(store.confirm_plan());
		assert!(store.session().is_premium_active);
		assert_eq!(backend.snapshot().get(PREMIUM_PLAN_KEY).map(String::as_str), Some("4"));

		store.set_plan(PremiumPlan::Basic);
		assert_eq!(store.session().selected_plan, Some(PremiumPlan::Basic));
		assert!(!store.session().is_premium_active);
		assert_eq!(backend.snapshot().get(PREMIUM_PLAN_KEY), None);
	}

	#[test]
	fn login_survives_reload() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);
		store.login(user(), "tok".to_string());

		let store = reload(store);
		assert_eq!(store.session().user, Some(user()));
		assert_eq!(store.session().auth_token.as_deref(), Some("tok"));
		assert!(store.is_authenticated());
	}

	#[test]
	fn logout_keeps_premium() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);
		store.login(user(), "tok".to_string());
		store.subscribe(PremiumPlan::Elite);

		store.logout();
		assert_eq!(store.session().user, None);
		assert_eq!(store.session().auth_token, None);
		assert!(!store.is_authenticated());
		assert_eq!(store.session().selected_plan, Some(PremiumPlan::Elite));
		assert!(store.session().is_premium_active);

		let snapshot = backend.snapshot();
		assert!(!snapshot.contains_key(USER_KEY));
		assert!(!snapshot.contains_key(AUTH_TOKEN_KEY));
		assert_eq!(snapshot.get(PREMIUM_PLAN_KEY).map(String::as_str), Some("5"));
	}

	#[test]
	fn confirmed_plan_is_active_after_reload() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);
		store.subscribe(PremiumPlan::Basic);

		let store = reload(store);
		assert_eq!(store.session().selected_plan, Some(PremiumPlan::Basic));
		assert!(store.session().is_premium_active);
	}

	#[test]
	fn unconfirmed_switch_is_not_restored() {
		let backend = MemoryBackend::new();
		let mut store = store(&backend);
		store.subscribe(PremiumPlan::Pro);
		store.set_plan(PremiumPlan::Elite);

		let store = reload(store);
		assert_eq!(store.session().selected_plan, None);
		assert!(!store.session().is_premium_active);
	}

	#[test]
	fn malformed_entries_are_discarded() {
		let backend = MemoryBackend::new();
		backend.write(USER_KEY, "not json").unwrap();
		backend.write(PREMIUM_PLAN_KEY, "9").unwrap();

		let store = store(&backend);
		assert_eq!(store.session(), &Session::default());
		assert!(backend.snapshot().is_empty());
	}

	#[test]
	fn orphan_token_is_removed() {
		let backend = MemoryBackend::new();
		backend.write(AUTH_TOKEN_KEY, "stale").unwrap();

		let store = store(&backend);
		assert_eq!(store.session().auth_token, None);
		assert_eq!(backend.snapshot().get(AUTH_TOKEN_KEY), None);
	}

	#[test]
	fn user_without_token_is_still_authenticated() {
		let backend = MemoryBackend::new();
		backend
			.write(USER_KEY, &serde_json::to_string(&user()).unwrap())
			.unwrap();

		let store = store(&backend);
		assert!(store.is_authenticated());
		assert_eq!(store.session().auth_token, None);
	}

	#[test]
	fn disabled_storage_keeps_memory_state() {
		let backend = MemoryBackend::disabled();
		let mut store = store(&backend);

		store.login(user(), "tok".to_string());
		store.subscribe(PremiumPlan::Pro);
		assert!(store.is_authenticated());
		assert!(store.session().is_premium_active);

		backend.set_available(true);
		assert!(backend.snapshot().is_empty());

		// Nothing reached storage, so a reload starts over
		let store = reload(store);
		assert_eq!(store.session(), &Session::default());
	}

	#[test]
	fn quota_failure_is_soft() {
		let backend = MemoryBackend::with_quota(16);
		let mut store = store(&backend);

		store.login(user(), "tok".to_string());
		assert_eq!(store.session().user, Some(user()));
		assert!(!backend.snapshot().contains_key(USER_KEY));
	}
}
