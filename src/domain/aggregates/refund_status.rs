//! Refund lifecycle as reported by the backend.
//!
//! Transitions happen server-side; this side only maps a status to what the
//! buyer sees and may do next.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Negotiation,
    Approved,
    ReturnShipped,
    ReturnReceived,
    Processing,
    Completed,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Info,
    Warning,
    Success,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundAction {
    Cancel,
    AcceptOffer,
    CounterOffer,
    ShipReturn,
    Escalate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusMeta {
    pub status: RefundStatus,
    pub label: &'static str,
    pub tone: Tone,
    pub terminal: bool,
    pub actions: &'static [RefundAction],
}

pub static STATUS_TABLE: [StatusMeta; 10] = [
    StatusMeta { status: RefundStatus::Pending, label: "Pending review", tone: Tone::Warning, terminal: false, actions: &[RefundAction::Cancel] },
    StatusMeta { status: RefundStatus::Negotiation, label: "In negotiation", tone: Tone::Info, terminal: false, actions: &[RefundAction::AcceptOffer, RefundAction::CounterOffer, RefundAction::Cancel, RefundAction::Escalate] },
    StatusMeta { status: RefundStatus::Approved, label: "Approved", tone: Tone::Success, terminal: false, actions: &[RefundAction::ShipReturn] },
    StatusMeta { status: RefundStatus::ReturnShipped, label: "Return shipped", tone: Tone::Info, terminal: false, actions: &[] },
    StatusMeta { status: RefundStatus::ReturnReceived, label: "Return received", tone: Tone::Info, terminal: false, actions: &[RefundAction::Escalate] },
    StatusMeta { status: RefundStatus::Processing, label: "Processing payout", tone: Tone::Info, terminal: false, actions: &[] },
    StatusMeta { status: RefundStatus::Completed, label: "Completed", tone: Tone::Success, terminal: true, actions: &[] },
    StatusMeta { status: RefundStatus::Rejected, label: "Rejected", tone: Tone::Danger, terminal: true, actions: &[RefundAction::Escalate] },
    StatusMeta { status: RefundStatus::Cancelled, label: "Cancelled", tone: Tone::Neutral, terminal: true, actions: &[] },
    StatusMeta { status: RefundStatus::Unknown, label: "Unknown", tone: Tone::Neutral, terminal: false, actions: &[] },
];

impl RefundStatus {
    /// Reads a backend status string; anything unrecognised maps to `Unknown`.
    pub fn parse(value: &str) -> Self {
        STATUS_TABLE.iter()
            .map(|m| m.status)
            .find(|s| *s != Self::Unknown && s.as_str() == value.trim().to_ascii_lowercase())
            .unwrap_or(Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Negotiation => "negotiation",
            Self::Approved => "approved",
            Self::ReturnShipped => "return_shipped",
            Self::ReturnReceived => "return_received",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    pub fn meta(&self) -> &'static StatusMeta {
        STATUS_TABLE.iter().find(|m| m.status == *self).unwrap_or(&STATUS_TABLE[STATUS_TABLE.len() - 1])
    }

    pub fn label(&self) -> &'static str { self.meta().label }
    pub fn is_terminal(&self) -> bool { self.meta().terminal }
    pub fn allows(&self, action: RefundAction) -> bool { self.meta().actions.contains(&action) }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}
