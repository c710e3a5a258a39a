//! Marketplace Core
//!
//! Computation engine behind the marketplace seller and buyer forms.
//!
//! ## Features
//! - Variant matrix generation (cartesian SKUs) with edit-preserving merge
//! - Product form session with submission checks
//! - Refund breakdown: base amount, method fee, payout
//! - Refund request validation and status metadata
//! - Stateless JSON service exposing the calculations

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod http;

pub use domain::aggregates::{
    compute_breakdown, generate_combinations, is_method_allowed, remove_option, ProductDefaults, ProductForm,
    RefundBreakdown, RefundLineItem, RefundMethod, RefundMethodKind, RefundRequest, RefundRequestDraft, RefundStatus,
    RefundType, SkuCombination, VariantGroup, VariantOption,
};
pub use domain::value_objects::{parse_amount, parse_count, ComboKey, ImageRef, WeightUnit};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error(transparent)]
    Variant(#[from] domain::aggregates::VariantError),

    #[error(transparent)]
    Sku(#[from] domain::aggregates::SkuValidationError),

    #[error(transparent)]
    Refund(#[from] domain::aggregates::RefundValidationError),

    #[error("Variant groups produce {count} combinations, more than the limit of {limit}")]
    MatrixTooLarge { count: usize, limit: usize },

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
