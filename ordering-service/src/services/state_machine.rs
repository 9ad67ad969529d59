//! Order status state machine.
//!
//! ```text
//! pendiente -> pagado | cancelado
//! pagado    -> entregado | cancelado
//! entregado, cancelado: terminal
//! ```
//!
//! Role checks happen before this point; only state legality is decided here.

use super::error::OrderError;
use crate::models::{IdentityContext, OrderStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Statuses reachable in one step from `from`, excluding itself.
    pub fn allowed_next(from: OrderStatus) -> &'static [OrderStatus] {
        match from {
            OrderStatus::Pendiente => &[OrderStatus::Pagado, OrderStatus::Cancelado],
            OrderStatus::Pagado => &[OrderStatus::Entregado, OrderStatus::Cancelado],
            OrderStatus::Entregado | OrderStatus::Cancelado => &[],
        }
    }

    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        Self::allowed_next(from).contains(&to)
    }

    /// Compute the status after a requested change.
    ///
    /// Requesting the current status is an accepted no-op, so retried
    /// updates succeed; this holds for terminal statuses too.
    pub fn transition(
        current: OrderStatus,
        requested: OrderStatus,
        identity: &IdentityContext,
    ) -> Result<OrderStatus, OrderError> {
        if current == requested {
            tracing::debug!(
                actor = identity.subject_id(),
                status = %current,
                "Status unchanged"
            );
            return Ok(current);
        }

        if Self::is_valid_transition(current, requested) {
            Ok(requested)
        } else {
            Err(OrderError::IllegalStatusTransition {
                from: current,
                to: requested,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn owner() -> IdentityContext {
        IdentityContext::new(5, "owner@example.com", Role::Restaurante)
    }

    #[test]
    fn test_forward_transitions() {
        let id = owner();
        assert_eq!(
            OrderStateMachine::transition(OrderStatus::Pendiente, OrderStatus::Pagado, &id).unwrap(),
            OrderStatus::Pagado
        );
        assert_eq!(
            OrderStateMachine::transition(OrderStatus::Pagado, OrderStatus::Entregado, &id)
                .unwrap(),
            OrderStatus::Entregado
        );
        assert_eq!(
            OrderStateMachine::transition(OrderStatus::Pendiente, OrderStatus::Cancelado, &id)
                .unwrap(),
            OrderStatus::Cancelado
        );
        assert_eq!(
            OrderStateMachine::transition(OrderStatus::Pagado, OrderStatus::Cancelado, &id)
                .unwrap(),
            OrderStatus::Cancelado
        );
    }

    #[test]
    fn test_skipping_payment_is_illegal() {
        let result =
            OrderStateMachine::transition(OrderStatus::Pendiente, OrderStatus::Entregado, &owner());
        assert!(matches!(
            result,
            Err(OrderError::IllegalStatusTransition {
                from: OrderStatus::Pendiente,
                to: OrderStatus::Entregado
            })
        ));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let id = owner();
        for from in [OrderStatus::Entregado, OrderStatus::Cancelado] {
            assert!(OrderStateMachine::allowed_next(from).is_empty());
            for to in OrderStatus::ALL.into_iter().filter(|to| *to != from) {
                assert!(
                    OrderStateMachine::transition(from, to, &id).is_err(),
                    "{} -> {} should be illegal",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_self_transition_is_noop_for_every_status() {
        let id = owner();
        for status in OrderStatus::ALL {
            assert_eq!(
                OrderStateMachine::transition(status, status, &id).unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_no_path_leads_back_to_pendiente() {
        for from in OrderStatus::ALL {
            assert!(!OrderStateMachine::allowed_next(from).contains(&OrderStatus::Pendiente));
        }
    }

    #[test]
    fn test_transition_table_matches_dag() {
        let legal = [
            (OrderStatus::Pendiente, OrderStatus::Pagado),
            (OrderStatus::Pendiente, OrderStatus::Cancelado),
            (OrderStatus::Pagado, OrderStatus::Entregado),
            (OrderStatus::Pagado, OrderStatus::Cancelado),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    OrderStateMachine::is_valid_transition(from, to),
                    legal.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }
}
