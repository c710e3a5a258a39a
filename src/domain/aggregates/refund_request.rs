//! Refund Request Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::refund::{self, RefundBreakdown, RefundLineItem, RefundMethodKind, RefundType};
use crate::domain::events::{DomainEvent, RefundEvent};

/// What gets submitted once the buyer confirms the form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct RefundRequest {
    pub order_id: String,
    pub refund_type: RefundType,
    pub method: RefundMethodKind,
    #[serde(default)]
    pub items: Vec<RefundLineItem>,
    #[serde(default)]
    pub partial_amount: Option<Decimal>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub reason: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl RefundRequest {
    pub fn breakdown(&self) -> RefundBreakdown {
        refund::compute_breakdown(&self.items, self.refund_type, self.method, self.partial_amount)
    }

    pub fn max_partial_amount(&self) -> Decimal { refund::max_partial_amount(refund::selected_total(&self.items)) }

    /// Checks the submission rules and returns the breakdown that would be paid.
    pub fn validate_submission(&self) -> Result<RefundBreakdown, RefundValidationError> {
        self.validate().map_err(|e| RefundValidationError::Invalid(e.to_string()))?;
        if self.reason.trim().is_empty() { return Err(RefundValidationError::ReasonRequired); }
        if self.items.is_empty() { return Err(RefundValidationError::NoItemsSelected); }
        if !refund::is_method_allowed(self.refund_type, self.method.method()) {
            return Err(RefundValidationError::MethodNotAllowed { method: self.method, refund_type: self.refund_type });
        }
        if self.refund_type == RefundType::KeepItem {
            let cap = self.max_partial_amount();
            match self.partial_amount {
                Some(amount) if amount > cap => return Err(RefundValidationError::PartialAmountExceedsCap { amount, cap }),
                Some(amount) if amount > Decimal::ZERO => {}
                _ => return Err(RefundValidationError::PartialAmountRequired),
            }
        }
        Ok(self.breakdown())
    }
}

/// Buyer-side session state for a refund request.
#[derive(Clone, Debug)]
pub struct RefundRequestDraft {
    request: RefundRequest,
    breakdown: RefundBreakdown,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl RefundRequestDraft {
    pub fn new(order_id: impl Into<String>, refund_type: RefundType) -> Self {
        let request = RefundRequest {
            order_id: order_id.into(), refund_type, method: refund_type.default_method(),
            items: vec![], partial_amount: None, reason: String::new(), description: None,
        };
        let breakdown = request.breakdown();
        let now = Utc::now();
        Self { request, breakdown, created_at: now, updated_at: now, events: vec![] }
    }

    pub fn request(&self) -> &RefundRequest { &self.request }
    pub fn breakdown(&self) -> &RefundBreakdown { &self.breakdown }
    pub fn refund_type(&self) -> RefundType { self.request.refund_type }
    pub fn method(&self) -> RefundMethodKind { self.request.method }
    pub fn max_partial_amount(&self) -> Decimal { self.request.max_partial_amount() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Switches the refund type. A method the new type does not accept is
    /// replaced with the type's default method.
    pub fn set_refund_type(&mut self, refund_type: RefundType) {
        if refund_type == self.request.refund_type { return; }
        self.request.refund_type = refund_type;
        self.raise_event(DomainEvent::Refund(RefundEvent::TypeChanged { refund_type }));
        if !self.request.method.method().allows(refund_type) {
            let from = self.request.method;
            let to = refund_type.default_method();
            self.request.method = to;
            self.raise_event(DomainEvent::Refund(RefundEvent::MethodReset { from, to }));
        }
        if refund_type != RefundType::KeepItem { self.request.partial_amount = None; }
        self.refresh();
    }

    pub fn set_method(&mut self, method: RefundMethodKind) -> Result<(), RefundValidationError> {
        if !method.method().allows(self.request.refund_type) {
            return Err(RefundValidationError::MethodNotAllowed { method, refund_type: self.request.refund_type });
        }
        self.request.method = method;
        self.refresh();
        Ok(())
    }

    pub fn select_items(&mut self, items: Vec<RefundLineItem>) {
        self.request.items = items;
        self.refresh();
    }

    pub fn set_partial_amount(&mut self, amount: Option<Decimal>) {
        self.request.partial_amount = amount;
        self.refresh();
    }

    pub fn set_reason(&mut self, reason: impl Into<String>, description: Option<String>) {
        self.request.reason = reason.into();
        self.request.description = description;
        self.touch();
    }

    pub fn validate(&self) -> Result<RefundBreakdown, RefundValidationError> { self.request.validate_submission() }

    pub fn into_request(self) -> RefundRequest { self.request }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn refresh(&mut self) {
        let breakdown = self.request.breakdown();
        if breakdown != self.breakdown {
            self.breakdown = breakdown;
            self.raise_event(DomainEvent::Refund(RefundEvent::BreakdownChanged { breakdown }));
        }
        self.touch();
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefundValidationError {
    #[error("A reason is required")]
    ReasonRequired,
    #[error("Select at least one item")]
    NoItemsSelected,
    #[error("Refund method {method} is not available for {refund_type}")]
    MethodNotAllowed { method: RefundMethodKind, refund_type: RefundType },
    #[error("Enter a partial refund amount")]
    PartialAmountRequired,
    #[error("Partial refund {amount} exceeds the maximum of {cap}")]
    PartialAmountExceedsCap { amount: Decimal, cap: Decimal },
    #[error("Invalid request: {0}")]
    Invalid(String),
}
