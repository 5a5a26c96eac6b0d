pub mod config_manager;
pub mod error;
pub mod generator;
pub mod store;
pub mod tracker;
pub mod types;

pub use config_manager::*;
pub use error::*;
pub use generator::{generate_results, risk_points, risk_score};
pub use store::*;
pub use tracker::*;
pub use types::*;
