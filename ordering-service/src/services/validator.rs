//! Order request validation.
//!
//! Pure checks over the request payload. Existence of the referenced
//! restaurant, client and products is the lifecycle service's job.

use rust_decimal::Decimal;

use super::error::ValidationError;
use crate::models::{OrderLine, OrderRequest, OrderStatus, ValidOrder};

/// Currency amounts carry at most this many fraction digits.
pub const CURRENCY_SCALE: u32 = 2;

/// Order request validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderValidator;

impl OrderValidator {
    /// Validate a new order request.
    ///
    /// Returns the first violation found, checking ids, initial status,
    /// lines, then the total.
    pub fn validate(request: &OrderRequest) -> Result<ValidOrder, ValidationError> {
        if request.restaurant_id <= 0 {
            return Err(ValidationError::InvalidRestaurantId(request.restaurant_id));
        }

        if request.client_id <= 0 {
            return Err(ValidationError::InvalidClientId(request.client_id));
        }

        if let Some(status) = request.status {
            if status != OrderStatus::Pendiente {
                return Err(ValidationError::InvalidInitialStatus(status));
            }
        }

        if request.lines.is_empty() {
            return Err(ValidationError::EmptyOrderLines);
        }

        let mut lines = Vec::with_capacity(request.lines.len());
        let mut expected = Decimal::ZERO;

        for (index, line) in request.lines.iter().enumerate() {
            if line.product_id <= 0 {
                return Err(ValidationError::InvalidProductId {
                    line: index,
                    product_id: line.product_id,
                });
            }

            let quantity = u32::try_from(line.quantity)
                .ok()
                .filter(|q| *q >= 1)
                .ok_or(ValidationError::InvalidLineQuantity {
                    line: index,
                    quantity: line.quantity,
                })?;

            if !is_currency_amount(line.subtotal) {
                return Err(ValidationError::InvalidLineSubtotal {
                    line: index,
                    subtotal: line.subtotal,
                });
            }

            expected = expected
                .checked_add(line.subtotal)
                .ok_or(ValidationError::InvalidLineSubtotal {
                    line: index,
                    subtotal: line.subtotal,
                })?;

            lines.push(OrderLine {
                product_id: line.product_id,
                quantity,
                subtotal: line.subtotal,
            });
        }

        // Decimal equality is numeric: 29.98 == 29.980
        if request.total != expected {
            return Err(ValidationError::TotalMismatch {
                expected,
                actual: request.total,
            });
        }

        Ok(ValidOrder::new(
            request.restaurant_id,
            request.client_id,
            request.comments.clone(),
            lines,
            request.total,
        ))
    }
}

/// Non-negative with no more than [`CURRENCY_SCALE`] significant fraction digits.
fn is_currency_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount.normalize().scale() <= CURRENCY_SCALE
}
