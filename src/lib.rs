pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod modifiers;
pub mod planner;
pub mod processing;
pub mod record;
pub mod reference;
pub mod store;
pub mod verify;

pub use error::PricingError;
