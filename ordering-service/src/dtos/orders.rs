use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    Order, OrderFilter, OrderLine, OrderLineRequest, OrderRequest, OrderStatus, ProductId,
    RestaurantId, UserId,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub restaurant_id: RestaurantId,
    pub client_id: UserId,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Comments must be at most 500 characters"))]
    pub comments: Option<String>,
    pub lines: Vec<OrderLineRequest>,
    pub total: Decimal,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            restaurant_id: req.restaurant_id,
            client_id: req.client_id,
            status: req.status,
            comments: req.comments,
            lines: req.lines,
            total: req.total,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Replaces the order's comments when present.
    #[serde(default)]
    #[validate(length(max = 500, message = "Comments must be at most 500 characters"))]
    pub comments: Option<String>,
}

/// Query string of `GET /orders/restaurant/:restaurant_id`.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantOrdersParams {
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl From<RestaurantOrdersParams> for OrderFilter {
    fn from(params: RestaurantOrdersParams) -> Self {
        Self {
            status: params.status,
            from: params.from,
            to: params.to,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLineResponse {
    pub product_id: ProductId,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            subtotal: line.subtotal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub client_id: UserId,
    pub restaurant_id: RestaurantId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub comments: Option<String>,
    pub lines: Vec<OrderLineResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            client_id: order.client_id,
            restaurant_id: order.restaurant_id,
            status: order.status,
            total: order.total,
            comments: order.comments,
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: usize,
}

impl From<Vec<Order>> for OrderListResponse {
    fn from(orders: Vec<Order>) -> Self {
        let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
        Self {
            total: orders.len(),
            orders,
        }
    }
}
