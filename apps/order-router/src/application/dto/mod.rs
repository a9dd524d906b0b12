//! Data Transfer Objects
//!
//! DTOs for crossing the application boundary.

mod order_dto;
mod position_dto;

pub use order_dto::{CreateOrderDto, OrderDto, PlaceOrderAckDto, ScheduledOrderDto};
pub use position_dto::ClosePositionDto;
