//! Payment domain types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use microloan_shared::types::{ApplicationId, MinorUnits};

/// Metadata key carrying the application id on a gateway intent.
pub const METADATA_APPLICATION_ID: &str = "application_id";

/// Metadata key carrying the payment kind on a gateway intent.
pub const METADATA_KIND: &str = "kind";

/// Prefix of gateway payment intent ids.
pub const GATEWAY_INTENT_PREFIX: &str = "pi_";

/// What a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentKind {
    /// The one-time intake fee.
    ApplicationFee,
    /// A repayment against the loan balance.
    Repayment,
}

impl PaymentKind {
    /// Returns the string stored in gateway metadata.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationFee => "application_fee",
            Self::Repayment => "repayment",
        }
    }

    /// Parses a kind from metadata or request text.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "application_fee" | "applicationFee" => Some(Self::ApplicationFee),
            "repayment" => Some(Self::Repayment),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to open a payment intent with the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRequest {
    /// Application the payment is for.
    pub application_id: ApplicationId,
    /// Fee or repayment.
    pub kind: PaymentKind,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Lowercase ISO 4217 code.
    pub currency: String,
}

/// Lifecycle status of a gateway intent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Waiting for a payment method.
    RequiresPaymentMethod,
    /// Waiting for confirmation.
    RequiresConfirmation,
    /// Waiting for customer action (3-D Secure etc).
    RequiresAction,
    /// Being processed.
    Processing,
    /// Authorized but not captured.
    RequiresCapture,
    /// Abandoned.
    Canceled,
    /// Money captured.
    Succeeded,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

/// A payment intent as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayIntent {
    /// Gateway intent id; used as the transaction id on confirmation.
    pub id: String,
    /// Secret the client uses to complete the payment.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    /// Current status.
    pub status: IntentStatus,
    /// Tags set at creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl GatewayIntent {
    /// Returns true if the intent was opened for this application and kind.
    #[must_use]
    pub fn is_for(&self, application_id: ApplicationId, kind: PaymentKind) -> bool {
        let app_matches = self
            .metadata
            .get(METADATA_APPLICATION_ID)
            .is_some_and(|v| *v == application_id.to_string());
        let kind_matches = self
            .metadata
            .get(METADATA_KIND)
            .and_then(|v| PaymentKind::parse(v))
            == Some(kind);
        app_matches && kind_matches
    }
}

/// Result returned to the client after opening an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Secret the client uses to complete the payment.
    pub client_secret: String,
    /// Gateway intent id.
    pub intent_id: String,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Lowercase ISO 4217 code.
    pub currency: String,
}

/// A confirmation request from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Gateway intent id.
    pub transaction_id: String,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Fee or repayment.
    pub kind: PaymentKind,
}
