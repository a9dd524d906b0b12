//! Canonical request -> Dhan order payload mapping.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::api_types::DhanOrderRequest;
use super::error::DhanError;
use crate::application::ports::BrokerOrderRequest;
use crate::domain::order_execution::OrderType;

const DEFAULT_SEGMENT: &str = "NSE_EQ";
const DEFAULT_PRODUCT_TYPE: &str = "INTRADAY";

/// Build the `POST /v2/orders` body.
///
/// Price is only sent when positive. Dhan trades whole shares only, so the
/// quantity must be a positive whole number.
pub fn to_order_request(
    request: &BrokerOrderRequest,
    client_id: &str,
) -> Result<DhanOrderRequest, DhanError> {
    let meta = &request.metadata;
    let price = request.price.filter(|p| *p > Decimal::ZERO);

    Ok(DhanOrderRequest {
        dhan_client_id: client_id.to_string(),
        transaction_type: request.side.as_str().to_string(),
        exchange_segment: meta
            .exchange
            .clone()
            .unwrap_or_else(|| DEFAULT_SEGMENT.to_string()),
        product_type: meta
            .product_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
        order_type: order_type_code(request.order_type).to_string(),
        validity: "DAY".to_string(),
        security_id: request.symbol.clone(),
        quantity: whole_quantity(request.quantity)?,
        price,
    })
}

fn whole_quantity(quantity: Decimal) -> Result<u64, DhanError> {
    if quantity <= Decimal::ZERO || quantity.fract() != Decimal::ZERO {
        return Err(DhanError::InvalidQuantity(quantity.to_string()));
    }
    quantity
        .to_u64()
        .ok_or_else(|| DhanError::InvalidQuantity(quantity.to_string()))
}

/// Dhan spelling of an order type.
pub const fn order_type_code(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "MARKET",
        OrderType::Limit => "LIMIT",
        OrderType::StopLossLimit => "STOP_LOSS",
        OrderType::StopLossMarket => "STOP_LOSS_MARKET",
    }
}
