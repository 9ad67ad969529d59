use rust_decimal::Decimal;
use service_core::error::AppError;
use thiserror::Error;

use crate::models::{OrderId, OrderStatus, ProductId, RestaurantId, UserId};

/// Why an order request (or a finder query) was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid restaurant id: {0}")]
    InvalidRestaurantId(RestaurantId),

    #[error("Invalid client id: {0}")]
    InvalidClientId(UserId),

    #[error("New orders must start as pendiente, got {0}")]
    InvalidInitialStatus(OrderStatus),

    #[error("Order must contain at least one line")]
    EmptyOrderLines,

    #[error("Line {line}: invalid product id {product_id}")]
    InvalidProductId { line: usize, product_id: ProductId },

    #[error("Line {line}: quantity must be between 1 and {}, got {quantity}", u32::MAX)]
    InvalidLineQuantity { line: usize, quantity: i64 },

    #[error("Line {line}: subtotal {subtotal} must be non-negative with at most 2 decimals")]
    InvalidLineSubtotal { line: usize, subtotal: Decimal },

    #[error("Total {actual} does not match sum of line subtotals {expected}")]
    TotalMismatch { expected: Decimal, actual: Decimal },

    #[error("Invalid date range: start is after end")]
    InvalidDateRange,
}

/// Failure of an order lifecycle operation.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Bad order request: {0}")]
    BadOrderRequest(#[from] ValidationError),

    /// `reason` is for logs only and is left out of the message.
    #[error("Unauthorized access")]
    UnauthorizedAccess { reason: String },

    #[error("Illegal status transition from {from} to {to}")]
    IllegalStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(RestaurantId),

    #[error("Client not found: {0}")]
    ClientNotFound(UserId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Internal failure: {0}")]
    InternalFailure(#[from] anyhow::Error),
}

impl OrderError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::BadOrderRequest(_) => "bad_order_request",
            OrderError::UnauthorizedAccess { .. } => "unauthorized_access",
            OrderError::IllegalStatusTransition { .. } => "illegal_status_transition",
            OrderError::OrderNotFound(_) => "order_not_found",
            OrderError::RestaurantNotFound(_) => "restaurant_not_found",
            OrderError::ClientNotFound(_) => "client_not_found",
            OrderError::ProductNotFound(_) => "product_not_found",
            OrderError::InternalFailure(_) => "internal_failure",
        }
    }

    /// Only collaborator outages are worth retrying, and only by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::InternalFailure(_))
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::BadOrderRequest(e) => AppError::BadRequest(anyhow::anyhow!(e)),
            OrderError::UnauthorizedAccess { .. } => {
                AppError::Forbidden(anyhow::anyhow!("Unauthorized access"))
            }
            e @ OrderError::IllegalStatusTransition { .. } => {
                AppError::Conflict(anyhow::anyhow!(e.to_string()))
            }
            e @ (OrderError::OrderNotFound(_)
            | OrderError::RestaurantNotFound(_)
            | OrderError::ClientNotFound(_)
            | OrderError::ProductNotFound(_)) => AppError::NotFound(anyhow::anyhow!(e.to_string())),
            OrderError::InternalFailure(e) => AppError::InternalError(e),
        }
    }
}
