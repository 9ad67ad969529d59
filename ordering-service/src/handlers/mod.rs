pub mod health;
pub mod orders;

pub use health::{health_check, metrics_endpoint};
pub use orders::{
    create_order, delete_order, get_order, list_client_orders, list_restaurant_orders,
    update_order_status,
};
