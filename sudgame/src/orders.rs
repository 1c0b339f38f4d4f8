//! In-game purchase orders and round billing.
//!
//! Monetary amounts travel as strings with two decimal places, the
//! platform's wire format. This layer does not do arithmetic on them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::SudClient;
use crate::endpoints::ApiOperation;
use crate::errors::Result;

/// Request for the `create_order` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Host-side unique order id
    pub out_order_id: String,
    pub mg_id: String,
    pub room_id: String,
    /// The in-game action that triggered the purchase
    pub cmd: String,
    /// Paying user
    pub from_uid: String,
    /// Receiving user
    pub to_uid: String,
    /// Optional pass-through data echoed back in the order callback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// How users paid for a round, reported per round via
/// [`SudClient::report_game_round_bill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    /// Entry-ticket payments
    Ticket,
}

/// One user's spend within a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub uid: String,
    /// Amount with two decimal places, e.g. `"10.00"`
    pub amount: String,
}

/// Request for the `report_game_round_bill` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRoundBill {
    /// Idempotency key, unique per report, at most 64 characters
    pub request_id: String,
    pub mg_id: String,
    pub room_id: String,
    /// Round identifier assigned by the platform
    pub round_id: String,
    /// Total currency consumed in the round, two decimal places
    pub total_amount: String,
    pub payment_details: Vec<PaymentDetail>,
    pub payment_type: PaymentType,
}

#[derive(Debug, Clone, Serialize)]
struct QueryOrderRequest<'a> {
    out_order_id: &'a str,
}

impl SudClient {
    /// Create an in-game payment order.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Value> {
        let url = self.api_url(ApiOperation::CreateOrder).await?;
        tracing::debug!(out_order_id = %request.out_order_id, mg_id = %request.mg_id, "creating order");
        self.post_signed(url, request).await
    }

    /// Query an order by the host-side order id.
    pub async fn query_order(&self, out_order_id: &str) -> Result<Value> {
        let url = self.api_url(ApiOperation::QueryOrder).await?;
        self.post_signed(url, &QueryOrderRequest { out_order_id }).await
    }

    /// Report the currency consumed in one finished round.
    pub async fn report_game_round_bill(&self, bill: &GameRoundBill) -> Result<Value> {
        let url = self.api_url(ApiOperation::ReportGameRoundBill).await?;
        tracing::debug!(request_id = %bill.request_id, round_id = %bill.round_id, "reporting round bill");
        self.post_signed(url, bill).await
    }
}
