//! Refund breakdown: base amount, method fee and payout

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Share of the item value a keep-item refund may pay out (70%).
pub const PARTIAL_REFUND_CAP: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
/// Remittance pickup fee.
pub const MONEYBACK_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const WALLET_FEE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    /// Buyer ships the item back for the full value.
    ReturnItem,
    /// Buyer keeps the item and takes a capped partial refund.
    KeepItem,
    /// Item is swapped; no money moves.
    Replacement,
}

impl RefundType {
    pub const ALL: [RefundType; 3] = [Self::ReturnItem, Self::KeepItem, Self::Replacement];
    pub fn as_str(&self) -> &'static str {
        match self { Self::ReturnItem => "return_item", Self::KeepItem => "keep_item", Self::Replacement => "replacement" }
    }
    pub fn label(&self) -> &'static str {
        match self { Self::ReturnItem => "Return item", Self::KeepItem => "Keep item (partial refund)", Self::Replacement => "Replacement" }
    }
    /// Method preselected when this type is chosen.
    pub fn default_method(&self) -> RefundMethodKind {
        REFUND_METHODS.iter().find(|m| m.allows(*self)).map(|m| m.kind).unwrap_or(RefundMethodKind::Wallet)
    }
}

impl fmt::Display for RefundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethodKind {
    Wallet,
    Bank,
    Voucher,
    Moneyback,
    Replace,
}

impl RefundMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Wallet => "wallet", Self::Bank => "bank", Self::Voucher => "voucher", Self::Moneyback => "moneyback", Self::Replace => "replace" }
    }
    pub fn fee(&self) -> Decimal {
        match self {
            Self::Moneyback => MONEYBACK_FEE,
            Self::Wallet => WALLET_FEE,
            Self::Bank | Self::Voucher | Self::Replace => Decimal::ZERO,
        }
    }
    pub fn method(&self) -> &'static RefundMethod {
        // Every kind has exactly one catalog row.
        REFUND_METHODS.iter().find(|m| m.kind == *self).unwrap_or(&REFUND_METHODS[0])
    }
}

impl fmt::Display for RefundMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefundMethod {
    pub kind: RefundMethodKind,
    pub label: &'static str,
    pub description: &'static str,
    pub allowed_refund_types: &'static [RefundType],
}

impl RefundMethod {
    pub fn allows(&self, refund_type: RefundType) -> bool { self.allowed_refund_types.contains(&refund_type) }
    pub fn fee(&self) -> Decimal { self.kind.fee() }
}

const MONEY_TYPES: &[RefundType] = &[RefundType::ReturnItem, RefundType::KeepItem];

pub static REFUND_METHODS: [RefundMethod; 5] = [
    RefundMethod { kind: RefundMethodKind::Wallet, label: "Wallet", description: "Credited to the marketplace wallet", allowed_refund_types: MONEY_TYPES },
    RefundMethod { kind: RefundMethodKind::Bank, label: "Bank transfer", description: "Sent to the buyer's bank account", allowed_refund_types: MONEY_TYPES },
    RefundMethod { kind: RefundMethodKind::Voucher, label: "Voucher", description: "Issued as a store voucher", allowed_refund_types: MONEY_TYPES },
    RefundMethod { kind: RefundMethodKind::Moneyback, label: "Remittance", description: "Cash pickup through a remittance partner", allowed_refund_types: MONEY_TYPES },
    RefundMethod { kind: RefundMethodKind::Replace, label: "Replacement", description: "Item replaced, no refund issued", allowed_refund_types: &[RefundType::Replacement] },
];

/// Methods offered for a refund type, in catalog order.
pub fn methods_for(refund_type: RefundType) -> impl Iterator<Item = &'static RefundMethod> {
    REFUND_METHODS.iter().filter(move |m| m.allows(refund_type))
}

pub fn is_method_allowed(refund_type: RefundType, method: &RefundMethod) -> bool { method.allows(refund_type) }

/// One order line picked for the refund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefundLineItem {
    pub checkout_id: String,
    pub subtotal: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundBreakdown {
    pub base_amount: Decimal,
    pub fee: Decimal,
    pub final_amount: Decimal,
}

/// Sum of the selected subtotals. Negative subtotals count as zero and the
/// sum saturates instead of overflowing.
pub fn selected_total(items: &[RefundLineItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.subtotal.max(Decimal::ZERO)))
}

/// Ceiling for a keep-item refund, truncated to cents so it never exceeds 70%.
pub fn max_partial_amount(selected_total: Decimal) -> Decimal {
    selected_total.saturating_mul(PARTIAL_REFUND_CAP).round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Computes what the buyer would receive. A partial amount above the cap is
/// passed through as entered; rejecting it is the submitter's job.
pub fn compute_breakdown(items: &[RefundLineItem], refund_type: RefundType, method: RefundMethodKind, partial_amount: Option<Decimal>) -> RefundBreakdown {
    let total = selected_total(items);
    let base_amount = match refund_type {
        RefundType::ReturnItem | RefundType::Replacement => total,
        RefundType::KeepItem => partial_amount.filter(|a| *a > Decimal::ZERO).unwrap_or_else(|| max_partial_amount(total)),
    };
    let fee = method.fee();
    let final_amount = base_amount.saturating_sub(fee).max(Decimal::ZERO);
    debug!(%refund_type, %method, %base_amount, %fee, %final_amount, "refund breakdown computed");
    RefundBreakdown { base_amount, fee, final_amount }
}
