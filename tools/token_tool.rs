use std::env;

use fitarch_session::session::User;
use fitarch_session::utils::token::TokenGenerator;
use log::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	// Parse command line arguments
	let args: Vec<String> = env::args().collect();

	if args.len() == 4 && args[1] == "--verify" {
		let token_generator = TokenGenerator::new(&args[3]);
		let claims = token_generator.verify(&args[2])?;

		println!("Token is valid!");
		println!("User ID: {}", claims.sub);
		println!("Name: {}", claims.name);
		println!("Email: {}", claims.email);
		println!("Issued at: {}", claims.iat);
		println!("Expires at: {}", claims.exp);
		return Ok(());
	}

	if args.len() < 5 {
		println!(
			"Usage: {} <user_id> <name> <email> <jwt_secret> [days_valid]",
			args[0]
		);
		println!("       {} --verify <token> <jwt_secret>", args[0]);
		println!("  user_id: Unique identifier for the user");
		println!("  name: Display name for the user");
		println!("  email: Email address for the user");
		println!("  jwt_secret: Secret key used to sign the token");
		println!("  days_valid: (Optional) Number of days the token is valid for (default: 1)");
		return Ok(());
	}

	let user = User::new(&args[1], &args[2], &args[3]);
	let jwt_secret = &args[4];

	// Default to 1 day if not specified
	let days_valid = match args.get(5) {
		Some(days) => days.parse::<u64>()?,
		None => 1,
	};

	info!("Generating token for user {} ({})", user.name, user.id);
	info!("Token will be valid for {} days", days_valid);

	let token_generator = TokenGenerator::new(jwt_secret);
	let token = token_generator.generate_token(&user, days_valid)?;

	println!("Token generated successfully:");
	println!("{}", token);
	println!("\nThis token will expire in {} days", days_valid);

	Ok(())
}
