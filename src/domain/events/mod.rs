//! Domain events
use crate::domain::aggregates::refund::{RefundBreakdown, RefundMethodKind, RefundType};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Variant(VariantEvent),
    Refund(RefundEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantEvent {
    GroupAdded { group_id: String, title: String },
    GroupRemoved { group_id: String },
    OptionAdded { group_id: String, option_id: String },
    OptionRemoved { group_id: String, option_id: String },
    MatrixRebuilt { sku_count: usize },
    SkuUpdated { sku_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum RefundEvent {
    TypeChanged { refund_type: RefundType },
    MethodReset { from: RefundMethodKind, to: RefundMethodKind },
    BreakdownChanged { breakdown: RefundBreakdown },
}
