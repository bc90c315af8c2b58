pub mod cache;
pub mod cli;
pub mod engine;
pub mod error;
pub mod exact;
pub mod markets;
pub mod model;
pub mod rates;
pub mod render;
pub mod settings;

pub use cache::SimulationCache;
pub use engine::{simulate, simulate_inputs, simulate_request};
pub use error::{SimError, SimResult};
pub use markets::{FairOdds, Market, MarketKind, MarketReport, Quote};
pub use model::{
    MatchState, ModelParams, SimInputs, SimulationConfig, SimulationRequest, TeamRating,
};
