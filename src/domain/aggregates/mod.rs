//! Aggregates module
pub mod variant_matrix;
pub mod product_form;
pub mod refund;
pub mod refund_request;
pub mod refund_status;

pub use variant_matrix::{generate_combinations, remove_option, ProductDefaults, SkuCombination, VariantGroup, VariantOption};
pub use product_form::{ProductForm, SkuValidationError, VariantError};
pub use refund::{compute_breakdown, is_method_allowed, RefundBreakdown, RefundLineItem, RefundMethod, RefundMethodKind, RefundType};
pub use refund_request::{RefundRequest, RefundRequestDraft, RefundValidationError};
pub use refund_status::{RefundAction, RefundStatus, StatusMeta};
