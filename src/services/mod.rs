pub mod discovery;
pub mod generator;
pub mod ledger;
pub mod matching;
pub mod meal_plan;
pub mod profile;
pub mod providers;
pub mod random;
pub mod reciprocity;

pub use discovery::DiscoverySelector;
pub use generator::CandidateGenerator;
pub use ledger::InteractionLedger;
pub use matching::MatchingService;
pub use meal_plan::MealPlanner;
pub use profile::ProfileService;
pub use random::{RandomSource, SeededRandom};
pub use reciprocity::ReciprocityEngine;
