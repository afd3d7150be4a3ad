//! Result assembly: entity graphs and flat rows to response records.

mod dto;
mod mapper;

pub use dto::{AddressDto, OrderDto, OrderGraph, OrderItemDto, OrderItemGraph, SimpleOrderDto};
pub use mapper::{group_flat_rows, order_dtos, order_graphs, simple_order_dtos};
