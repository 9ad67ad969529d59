pub mod orders;

pub use orders::{
    CreateOrderRequest, OrderLineResponse, OrderListResponse, OrderResponse,
    RestaurantOrdersParams, UpdateStatusRequest,
};
