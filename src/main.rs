use std::env;
use std::process;

use fitarch_session::auth::{Authenticator, LoginForm, RegistrationForm};
use fitarch_session::catalog::{self, OFFERS};
use fitarch_session::config::Config;
use fitarch_session::error::{Result, SessionError};
use fitarch_session::session::{Navigation, PremiumPlan, RouteGuard, SessionStore};
use fitarch_session::storage::{DurableMirror, FileBackend};
use fitarch_session::utils::token::TokenGenerator;
use log::{error, info};

const USAGE: &str = "Usage: fitarch-session [--storage <path>] <command> [args]
  status                                   show the stored session
  login <email> <password>                 sign in
  register <name> <email> <password> <confirm> [plan]
                                           create an account, optionally on a paid plan
  logout                                   sign out (premium selection is kept)
  select-plan <plan>                       choose basic, pro or elite
  confirm-plan                             activate the selected plan
  subscribe <plan>                         choose and activate a plan
  open <path>                              check whether a view may be shown
  plans                                    list the available plans";

fn main() {
	env_logger::init();

	let args: Vec<String> = env::args().skip(1).collect();
	match run(&args) {
		Ok(()) => {}
		Err(SessionError::Validation(errors)) => {
			error!("Form rejected: {}", errors);
			for (field, message) in errors.iter() {
				eprintln!("{}: {}", field, message);
			}
			process::exit(1);
		}
		Err(e) => {
			error!("{}", e);
			eprintln!("error: {}", e);
			process::exit(1);
		}
	}
}

fn run(args: &[String]) -> Result<()> {
	let (config, command) = Config::load(args, |key| env::var(key).ok())?;

	let Some((name, params)) = command.split_first() else {
		println!("{}", USAGE);
		return Ok(());
	};

	if name == "plans" {
		print_plans();
		return Ok(());
	}

	info!("Using storage file {}", config.storage_path.display());
	let mirror = DurableMirror::new(FileBackend::new(&config.storage_path));
	let mut store = SessionStore::hydrate(mirror);
	let auth = Authenticator::new(TokenGenerator::new(&config.jwt_secret), config.token_days);

	match (name.as_str(), params) {
		("status", []) => {}
		("login", [email, password]) => {
			let form = LoginForm {
				email: email.clone(),
				password: password.clone(),
			};
			let user = auth.login(&mut store, &form)?;
			println!("Welcome back, {}", user.name);
		}
		("register", [full_name, email, password, confirm, rest @ ..]) if rest.len() <= 1 => {
			let plan = match rest.first() {
				Some(p) if p == "free" => None,
				Some(p) => Some(p.parse::<PremiumPlan>()?),
				None => None,
			};
			let form = RegistrationForm {
				full_name: full_name.clone(),
				email: email.clone(),
				password: password.clone(),
				confirm_password: confirm.clone(),
				agree_to_terms: true,
				plan,
			};
			let user = auth.register(&mut store, &form)?;
			println!("Account created for {}", user.name);
		}
		("logout", []) => store.logout(),
		("select-plan", [plan]) => store.set_plan(plan.parse()?),
		("confirm-plan", []) => {
			if !store.confirm_plan() {
				println!("No plan selected; nothing to confirm");
			}
		}
		("subscribe", [plan]) => store.subscribe(plan.parse()?),
		("open", [path]) => {
			match RouteGuard::resolve(path, store.session()) {
				Navigation::Render(view) => println!("render {} ({})", view, view.path()),
				Navigation::Redirect { to, replace } => println!(
					"redirect to {} ({}){}",
					to,
					to.path(),
					if replace { ", replacing history" } else { "" }
				),
			}
			return Ok(());
		}
		_ => {
			println!("{}", USAGE);
			return Err(SessionError::Config(format!("unrecognised command: {}", command.join(" "))));
		}
	}

	print_status(&store);
	Ok(())
}

fn print_status(store: &SessionStore<FileBackend>) {
	let session = store.session();
	println!("storage: {}", store.mirror().backend().path().display());
	match &session.user {
		Some(user) => println!("user: {} <{}> (id {})", user.name, user.email, user.id),
		None => println!("user: not signed in"),
	}
	println!(
		"token: {}",
		if session.auth_token.is_some() { "present" } else { "none" }
	);
	match session.selected_plan {
		Some(plan) => println!(
			"plan: {} (${:.2}/month, {})",
			plan,
			catalog::offer(plan).price,
			if session.is_premium_active { "active" } else { "not confirmed" }
		),
		None => println!("plan: none"),
	}
}

fn print_plans() {
	for offer in OFFERS.iter() {
		println!(
			"{:<6} ${:.2}/month{}",
			offer.plan.name(),
			offer.price,
			if offer.popular { "  (most popular)" } else { "" }
		);
		for feature in offer.features {
			println!("    - {}", feature);
		}
	}
}
