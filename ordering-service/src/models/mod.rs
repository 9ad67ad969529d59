//! Domain models for ordering-service.

mod identity;
mod order;

pub use identity::{IdentityContext, Role, UserId};
pub use order::{
    Order, OrderFilter, OrderId, OrderLine, OrderLineRequest, OrderRequest, OrderStatus,
    ProductId, RestaurantId, ValidOrder,
};
