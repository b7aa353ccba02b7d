use crate::session::models::PremiumPlan;

/// Display data for a subscription tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanOffer {
	pub plan: PremiumPlan,
	/// Monthly price in USD
	pub price: f64,
	pub features: &'static [&'static str],
	pub popular: bool,
}

pub static OFFERS: [PlanOffer; 3] = [
	PlanOffer {
		plan: PremiumPlan::Basic,
		price: 3.0,
		features: &["Remove ads", "Voice Assistant access"],
		popular: false,
	},
	PlanOffer {
		plan: PremiumPlan::Pro,
		price: 4.0,
		features: &["All Basic features", "AI Video Assistant", "Priority Support"],
		popular: true,
	},
	PlanOffer {
		plan: PremiumPlan::Elite,
		price: 5.0,
		features: &["All Pro features", "Early Feature Access", "Personalized Plans"],
		popular: false,
	},
];

pub fn offer(plan: PremiumPlan) -> &'static PlanOffer {
	match plan {
		PremiumPlan::Basic => &OFFERS[0],
		PremiumPlan::Pro => &OFFERS[1],
		PremiumPlan::Elite => &OFFERS[2],
	}
}
