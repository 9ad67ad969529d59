//! Order model for ordering-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::identity::UserId;

pub type OrderId = i64;
pub type RestaurantId = i64;
pub type ProductId = i64;

/// Order status.
///
/// `Entregado` and `Cancelado` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pendiente,
    Pagado,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pendiente,
        OrderStatus::Pagado,
        OrderStatus::Entregado,
        OrderStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "pendiente",
            OrderStatus::Pagado => "pagado",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Entregado | OrderStatus::Cancelado)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid order status: {}", s))
    }
}

/// One product line of an order. Owned by its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// A persisted order.
///
/// `id`, `client_id` and `restaurant_id` never change once assigned; status
/// changes go through the state machine and produce a new value via
/// [`Order::with_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: UserId,
    pub restaurant_id: RestaurantId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Next version of this order after an accepted status update.
    ///
    /// `comments` of `None` keeps the current comments.
    pub fn with_status(
        &self,
        status: OrderStatus,
        comments: Option<String>,
        updated_at: DateTime<Utc>,
    ) -> Order {
        Order {
            status,
            comments: comments.or_else(|| self.comments.clone()),
            updated_at,
            ..self.clone()
        }
    }

    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.subtotal).sum()
    }
}

/// Incoming line of an order request, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub subtotal: Decimal,
}

/// Incoming order request, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub restaurant_id: RestaurantId,
    pub client_id: UserId,
    /// Clients may omit it; anything other than `pendiente` is rejected.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub comments: Option<String>,
    pub lines: Vec<OrderLineRequest>,
    pub total: Decimal,
}

/// An order request that passed validation.
///
/// Only the validator constructs it, so holding one means the line and total
/// invariants were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    restaurant_id: RestaurantId,
    client_id: UserId,
    comments: Option<String>,
    lines: Vec<OrderLine>,
    total: Decimal,
}

impl ValidOrder {
    pub(crate) fn new(
        restaurant_id: RestaurantId,
        client_id: UserId,
        comments: Option<String>,
        lines: Vec<OrderLine>,
        total: Decimal,
    ) -> Self {
        Self {
            restaurant_id,
            client_id,
            comments,
            lines,
            total,
        }
    }

    pub fn restaurant_id(&self) -> RestaurantId {
        self.restaurant_id
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Materialize the order once the store has assigned an id.
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            client_id: self.client_id,
            restaurant_id: self.restaurant_id,
            status: OrderStatus::Pendiente,
            total: self.total,
            comments: self.comments,
            created_at: now,
            updated_at: now,
            lines: self.lines,
        }
    }
}

/// Filter parameters for restaurant-scoped order listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.from.map_or(true, |from| order.created_at >= from)
            && self.to.map_or(true, |to| order.created_at <= to)
    }
}
