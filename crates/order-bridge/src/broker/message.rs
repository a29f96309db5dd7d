//! Wire messages exchanged with the fulfillment side.
//!
//! Both directions are JSON objects keyed in camelCase.

use super::{BrokerError, Result};
use crate::model::{LineItem, OrderId};
use serde::{Deserialize, Serialize};

/// Outbound request asking downstream fulfillment to process an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub order_id: OrderId,
    pub line_items: Vec<LineItem>,
}

/// Inbound result for an order.
///
/// `status` stays a raw string so an unrecognized value can be reported as such instead of
/// failing the whole decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionMessage {
    pub order_id: OrderId,
    pub status: String,
}

impl FulfillmentRequest {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(BrokerError::from)
    }
}

impl CompletionMessage {
    pub fn new(order_id: OrderId, status: impl Into<String>) -> Self {
        Self {
            order_id,
            status: status.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(BrokerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductId;

    #[test]
    fn test_request_wire_shape() {
        let request = FulfillmentRequest {
            order_id: OrderId::from("o-1"),
            line_items: vec![LineItem {
                product_id: ProductId::from("product_1"),
                price: 10.0,
            }],
        };
        let json: serde_json::Value = serde_json::from_slice(&request.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "orderId": "o-1",
                "lineItems": [{ "productId": "product_1", "price": 10.0 }]
            })
        );
    }

    #[test]
    fn test_completion_keeps_unknown_status() {
        let message = CompletionMessage::decode(br#"{"orderId":"o-1","status":"shipped"}"#).unwrap();
        assert_eq!(message, CompletionMessage::new(OrderId::from("o-1"), "shipped"));
    }

    #[test]
    fn test_completion_without_order_id_is_a_codec_error() {
        let err = CompletionMessage::decode(br#"{"status":"completed"}"#).unwrap_err();
        assert!(matches!(err, BrokerError::Codec(_)));
    }
}
