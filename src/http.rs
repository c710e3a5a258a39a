//! JSON endpoints over the variant and refund calculations.
//!
//! Every handler is stateless: the caller sends the current form snapshot and
//! gets the derived values back.

use axum::{extract::Query, http::StatusCode, routing::{get, post}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::domain::aggregates::refund::{self, REFUND_METHODS};
use crate::domain::aggregates::refund_status::{StatusMeta, STATUS_TABLE};
use crate::domain::aggregates::{variant_matrix, ProductDefaults, RefundBreakdown, RefundLineItem, RefundMethodKind, RefundRequest, RefundType, SkuCombination, VariantGroup};
use crate::MarketplaceError;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "marketplace-core"})) }))
        .route("/api/v1/variants/combinations", post(generate_combinations))
        .route("/api/v1/variants/remove-option", post(remove_option))
        .route("/api/v1/refunds/methods", get(list_methods))
        .route("/api/v1/refunds/breakdown", post(compute_breakdown))
        .route("/api/v1/refunds/validate", post(validate_refund))
        .route("/api/v1/refunds/statuses", get(list_statuses))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}

impl MarketplaceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Variant(_) => StatusCode::NOT_FOUND,
            Self::Sku(_) | Self::Refund(_) | Self::MatrixTooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn reject(e: impl Into<MarketplaceError>) -> (StatusCode, String) {
    let e = e.into();
    (e.status_code(), e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct CombinationsRequest {
    pub groups: Vec<VariantGroup>,
    #[serde(default)]
    pub defaults: ProductDefaults,
    #[serde(default)]
    pub previous: Vec<SkuCombination>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CombinationsResponse {
    pub combinations: Vec<SkuCombination>,
    /// True when `previous` already matched; callers can skip their state update.
    pub unchanged: bool,
}

async fn generate_combinations(Json(r): Json<CombinationsRequest>) -> Result<Json<CombinationsResponse>, (StatusCode, String)> {
    let count = variant_matrix::combination_count(&r.groups);
    if count > variant_matrix::MAX_COMBINATIONS {
        return Err(reject(MarketplaceError::MatrixTooLarge { count, limit: variant_matrix::MAX_COMBINATIONS }));
    }
    let previous = Arc::new(r.previous);
    let next = variant_matrix::generate_combinations(&r.groups, &r.defaults, &previous);
    let unchanged = Arc::ptr_eq(&previous, &next);
    Ok(Json(CombinationsResponse { combinations: next.as_ref().clone(), unchanged }))
}

#[derive(Debug, Deserialize)]
pub struct RemoveOptionRequest { pub groups: Vec<VariantGroup>, pub group_id: String, pub option_id: String }

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupsResponse { pub groups: Vec<VariantGroup> }

async fn remove_option(Json(r): Json<RemoveOptionRequest>) -> Json<GroupsResponse> {
    Json(GroupsResponse { groups: variant_matrix::remove_option(&r.groups, &r.group_id, &r.option_id) })
}

#[derive(Debug, Deserialize)]
pub struct MethodsParams { pub refund_type: Option<RefundType> }

#[derive(Debug, Serialize, Deserialize)]
pub struct MethodView {
    pub kind: RefundMethodKind,
    pub label: String,
    pub description: String,
    pub fee: Decimal,
    pub allowed_refund_types: Vec<RefundType>,
}

async fn list_methods(Query(p): Query<MethodsParams>) -> Json<Vec<MethodView>> {
    let methods = REFUND_METHODS.iter()
        .filter(|m| p.refund_type.map_or(true, |t| m.allows(t)))
        .map(|m| MethodView { kind: m.kind, label: m.label.to_string(), description: m.description.to_string(), fee: m.fee(), allowed_refund_types: m.allowed_refund_types.to_vec() })
        .collect();
    Json(methods)
}

#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    #[serde(default)]
    pub items: Vec<RefundLineItem>,
    pub refund_type: RefundType,
    pub method: RefundMethodKind,
    #[serde(default)]
    pub partial_amount: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BreakdownResponse {
    pub base_amount: Decimal,
    pub fee: Decimal,
    pub final_amount: Decimal,
    pub selected_total: Decimal,
    pub max_partial_amount: Decimal,
    pub method_allowed: bool,
}

async fn compute_breakdown(Json(r): Json<BreakdownRequest>) -> Json<BreakdownResponse> {
    let RefundBreakdown { base_amount, fee, final_amount } = refund::compute_breakdown(&r.items, r.refund_type, r.method, r.partial_amount);
    let selected_total = refund::selected_total(&r.items);
    Json(BreakdownResponse {
        base_amount, fee, final_amount, selected_total,
        max_partial_amount: refund::max_partial_amount(selected_total),
        method_allowed: refund::is_method_allowed(r.refund_type, r.method.method()),
    })
}

async fn validate_refund(Json(r): Json<RefundRequest>) -> Result<Json<RefundBreakdown>, (StatusCode, String)> {
    r.validate_submission().map(Json).map_err(reject)
}

async fn list_statuses() -> Json<&'static [StatusMeta]> { Json(&STATUS_TABLE[..]) }
