//! Typed failures returned by the formula engine and the calculator.
//!
//! Infrastructure errors (file I/O, JSON, TOML) stay in `anyhow`; these are
//! the domain failures a rendering collaborator is expected to match on.

use crate::catalog::ProcessingChoice;

/// Errors from pricing and profit calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Negative, non-finite, fractional or overflowing numeric input.
    InvalidInput { reason: String },
    /// Item identifier does not resolve in the catalog.
    ItemNotFound { item_id: String },
    /// Processing path requested that the item's descriptor does not offer.
    UnsupportedProcessing {
        item_id: String,
        choice: ProcessingChoice,
    },
    /// Profession identifier does not resolve in the catalog.
    UnknownProfession { profession_id: String },
}

impl PricingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::InvalidInput { reason } => write!(f, "invalid input: {}", reason),
            PricingError::ItemNotFound { item_id } => write!(f, "item not found: {}", item_id),
            PricingError::UnsupportedProcessing { item_id, choice } => {
                write!(f, "item '{}' does not support {} processing", item_id, choice)
            }
            PricingError::UnknownProfession { profession_id } => {
                write!(f, "unknown profession: {}", profession_id)
            }
        }
    }
}

impl std::error::Error for PricingError {}
