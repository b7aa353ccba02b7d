use std::fmt;

use log::debug;

use crate::session::models::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	Public,
	Protected,
}

// Application views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
	Home,
	Login,
	Register,
	Dashboard,
	UploadVideo,
	PremiumPlans,
	NotFound,
}

impl View {
	pub const ROUTED: [View; 6] = [
		View::Home,
		View::Login,
		View::Register,
		View::Dashboard,
		View::UploadVideo,
		View::PremiumPlans,
	];

	pub fn path(&self) -> &'static str {
		match self {
			View::Home => "/",
			View::Login => "/login",
			View::Register => "/register",
			View::Dashboard => "/dashboard",
			View::UploadVideo => "/upload",
			View::PremiumPlans => "/premium",
			View::NotFound => "*",
		}
	}

	pub fn access(&self) -> Access {
		match self {
			View::Dashboard | View::UploadVideo | View::PremiumPlans => Access::Protected,
			View::Home | View::Login | View::Register | View::NotFound => Access::Public,
		}
	}

	/// Match a requested location against the route table. Query strings,
	/// fragments and a trailing slash are ignored and letter case does not
	/// matter; anything unmatched is `NotFound`.
	pub fn from_path(location: &str) -> View {
		let path = location
			.split(|c: char| c == '?' || c == '#')
			.next()
			.unwrap_or("");
		let path = match path.trim_end_matches('/') {
			"" => "/",
			trimmed => trimmed,
		};

		View::ROUTED
			.iter()
			.copied()
			.find(|view| view.path().eq_ignore_ascii_case(path))
			.unwrap_or(View::NotFound)
	}
}

impl fmt::Display for View {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			View::Home => "Home",
			View::Login => "Login",
			View::Register => "Register",
			View::Dashboard => "Dashboard",
			View::UploadVideo => "Upload Video",
			View::PremiumPlans => "Premium Plans",
			View::NotFound => "Not Found",
		};
		f.write_str(name)
	}
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
	Render(View),
	/// `replace` means the blocked location must not stay in history.
	Redirect { to: View, replace: bool },
}

impl Navigation {
	/// The view that ends up on screen.
	pub fn view(&self) -> View {
		match self {
			Navigation::Render(view) => *view,
			Navigation::Redirect { to, .. } => *to,
		}
	}
}

/// Access control applied before rendering a view.
///
/// Holds no state: every call looks at the session it is given.
pub struct RouteGuard;

impl RouteGuard {
	pub fn check(view: View, session: &Session) -> Navigation {
		match view.access() {
			Access::Protected if !session.is_authenticated() => {
				debug!("Blocked {} for unauthenticated session", view.path());
				Navigation::Redirect {
					to: View::Login,
					replace: true,
				}
			}
			_ => Navigation::Render(view),
		}
	}

	pub fn resolve(location: &str, session: &Session) -> Navigation {
		Self::check(View::from_path(location), session)
	}
}
