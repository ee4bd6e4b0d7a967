//! Card payments through an external gateway.
//!
//! Intent creation never touches the ledger. Confirmation is verified with
//! the gateway and then applied once per transaction id.

mod error;
mod gateway;
mod service;
mod types;

pub use error::PaymentError;
#[cfg(test)]
pub use gateway::MockPaymentGateway;
pub use gateway::{PaymentGateway, StripeGateway};
pub use service::PaymentService;
pub use types::{
    Confirmation, GATEWAY_INTENT_PREFIX, GatewayIntent, IntentRequest, IntentStatus,
    METADATA_APPLICATION_ID, METADATA_KIND, PaymentIntent, PaymentKind,
};
