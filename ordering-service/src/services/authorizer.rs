//! Ownership-based authorization.
//!
//! Decides whether an identity may perform an action on a target described
//! only by its ownership facts. Role is checked first, then ownership.

use std::fmt;

use super::error::OrderError;
use super::metrics::AUTHORIZATION_DENIALS_TOTAL;
use crate::models::{IdentityContext, RestaurantId, Role, UserId};

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateOrder,
    ViewOrder,
    ViewOrdersByRestaurant,
    ViewOrdersByClient,
    UpdateOrderStatus,
    DeleteOrder,
    ViewCatalog,
    CreateRestaurant,
    ManageRestaurant,
    ManageCatalog,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::CreateOrder,
        Action::ViewOrder,
        Action::ViewOrdersByRestaurant,
        Action::ViewOrdersByClient,
        Action::UpdateOrderStatus,
        Action::DeleteOrder,
        Action::ViewCatalog,
        Action::CreateRestaurant,
        Action::ManageRestaurant,
        Action::ManageCatalog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateOrder => "create_order",
            Action::ViewOrder => "view_order",
            Action::ViewOrdersByRestaurant => "view_orders_by_restaurant",
            Action::ViewOrdersByClient => "view_orders_by_client",
            Action::UpdateOrderStatus => "update_order_status",
            Action::DeleteOrder => "delete_order",
            Action::ViewCatalog => "view_catalog",
            Action::CreateRestaurant => "create_restaurant",
            Action::ManageRestaurant => "manage_restaurant",
            Action::ManageCatalog => "manage_catalog",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership facts about the resource being acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessTarget {
    /// User owning the restaurant involved.
    pub owner_user_id: Option<UserId>,
    /// Client the order (or listing) belongs to.
    pub client_id: Option<UserId>,
    pub restaurant_id: Option<RestaurantId>,
}

impl AccessTarget {
    /// Target without ownership facts (class-level checks).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn restaurant(restaurant_id: RestaurantId, owner_user_id: UserId) -> Self {
        Self {
            owner_user_id: Some(owner_user_id),
            restaurant_id: Some(restaurant_id),
            client_id: None,
        }
    }

    pub fn client(client_id: UserId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Self::default()
        }
    }

    pub fn order(restaurant_id: RestaurantId, owner_user_id: UserId, client_id: UserId) -> Self {
        Self {
            owner_user_id: Some(owner_user_id),
            client_id: Some(client_id),
            restaurant_id: Some(restaurant_id),
        }
    }
}

/// Authorization outcome. `Deny` carries a reason meant for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Stateless ownership authorizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipAuthorizer;

impl OwnershipAuthorizer {
    /// Decide whether `identity` may perform `action` on `target`.
    ///
    /// Total over its inputs: every combination yields exactly one decision.
    pub fn authorize(identity: &IdentityContext, action: Action, target: &AccessTarget) -> Decision {
        let role = identity.role();

        match action {
            Action::ViewCatalog => Decision::Allow,

            Action::CreateOrder => match role {
                Role::Cliente => Decision::Allow,
                _ => deny_role(identity, action),
            },

            Action::CreateRestaurant => match role {
                Role::Restaurante | Role::Admin => Decision::Allow,
                Role::Cliente => deny_role(identity, action),
            },

            Action::ViewOrdersByRestaurant
            | Action::UpdateOrderStatus
            | Action::DeleteOrder
            | Action::ManageRestaurant
            | Action::ManageCatalog => match role {
                Role::Admin => Decision::Allow,
                Role::Restaurante => require_restaurant_owner(identity, action, target),
                Role::Cliente => deny_role(identity, action),
            },

            Action::ViewOrdersByClient => match role {
                Role::Admin => Decision::Allow,
                Role::Cliente => require_client(identity, action, target),
                Role::Restaurante => deny_role(identity, action),
            },

            Action::ViewOrder => match role {
                Role::Admin => Decision::Allow,
                Role::Cliente => require_client(identity, action, target),
                Role::Restaurante => require_restaurant_owner(identity, action, target),
            },
        }
    }

    /// Like [`authorize`](Self::authorize), but a denial becomes
    /// [`OrderError::UnauthorizedAccess`] and is logged.
    pub fn require(
        identity: &IdentityContext,
        action: Action,
        target: &AccessTarget,
    ) -> Result<(), OrderError> {
        match Self::authorize(identity, action, target) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(denied(identity, action, reason)),
        }
    }
}

/// Log and count a denial, turning it into [`OrderError::UnauthorizedAccess`].
///
/// Also used for denials decided outside [`OwnershipAuthorizer::authorize`].
pub(crate) fn denied(identity: &IdentityContext, action: Action, reason: String) -> OrderError {
    tracing::warn!(
        actor = identity.subject_id(),
        role = %identity.role(),
        action = %action,
        reason = %reason,
        "Authorization denied"
    );
    AUTHORIZATION_DENIALS_TOTAL
        .with_label_values(&[action.as_str()])
        .inc();
    OrderError::UnauthorizedAccess { reason }
}

fn deny_role(identity: &IdentityContext, action: Action) -> Decision {
    Decision::Deny(format!(
        "role {} may not perform {}",
        identity.role(),
        action
    ))
}

fn require_restaurant_owner(
    identity: &IdentityContext,
    action: Action,
    target: &AccessTarget,
) -> Decision {
    match target.owner_user_id {
        Some(owner) if owner == identity.subject_id() => Decision::Allow,
        Some(owner) => Decision::Deny(format!(
            "subject {} is not the owner ({}) of restaurant {} for {}",
            identity.subject_id(),
            owner,
            describe(target.restaurant_id),
            action
        )),
        None => Decision::Deny(format!("{} requires a restaurant owner", action)),
    }
}

fn require_client(identity: &IdentityContext, action: Action, target: &AccessTarget) -> Decision {
    match target.client_id {
        Some(client) if client == identity.subject_id() => Decision::Allow,
        Some(client) => Decision::Deny(format!(
            "subject {} does not match client {} for {}",
            identity.subject_id(),
            client,
            action
        )),
        None => Decision::Deny(format!("{} requires a client id", action)),
    }
}

fn describe(id: Option<RestaurantId>) -> String {
    id.map_or_else(|| "?".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECT: UserId = 5;
    const OTHER: UserId = 99;

    fn identity(role: Role) -> IdentityContext {
        IdentityContext::new(SUBJECT, "someone@example.com", role)
    }

    /// Target whose every ownership fact points at `SUBJECT` or at `OTHER`.
    fn target(owned: bool) -> AccessTarget {
        let id = if owned { SUBJECT } else { OTHER };
        AccessTarget::order(1, id, id)
    }

    /// Reference table for the full action x role x ownership matrix.
    fn expected(action: Action, role: Role, owned: bool) -> bool {
        match (action, role) {
            (Action::ViewCatalog, _) => true,
            (Action::CreateOrder, Role::Cliente) => true,
            (Action::CreateOrder, _) => false,
            (Action::CreateRestaurant, Role::Cliente) => false,
            (Action::CreateRestaurant, _) => true,
            (_, Role::Admin) => true,
            (Action::ViewOrdersByClient, Role::Cliente) => owned,
            (Action::ViewOrdersByClient, Role::Restaurante) => false,
            (Action::ViewOrder, _) => owned,
            (_, Role::Restaurante) => owned,
            (_, Role::Cliente) => false,
        }
    }

    #[test]
    fn test_authorization_matrix_is_total_and_deterministic() {
        for action in Action::ALL {
            for role in Role::ALL {
                for owned in [true, false] {
                    let identity = identity(role);
                    let target = target(owned);

                    let first = OwnershipAuthorizer::authorize(&identity, action, &target);
                    let second = OwnershipAuthorizer::authorize(&identity, action, &target);
                    assert_eq!(first, second);

                    assert_eq!(
                        first.is_allowed(),
                        expected(action, role, owned),
                        "action={} role={} owned={}",
                        action,
                        role,
                        owned
                    );
                }
            }
        }
    }

    #[test]
    fn test_owner_may_update_status() {
        let owner = IdentityContext::new(5, "owner@example.com", Role::Restaurante);
        let target = AccessTarget::restaurant(1, 5);
        assert_eq!(
            OwnershipAuthorizer::authorize(&owner, Action::UpdateOrderStatus, &target),
            Decision::Allow
        );
    }

    #[test]
    fn test_non_owner_is_denied_with_reason() {
        let intruder = IdentityContext::new(99, "other@example.com", Role::Restaurante);
        let target = AccessTarget::restaurant(1, 5);
        match OwnershipAuthorizer::authorize(&intruder, Action::UpdateOrderStatus, &target) {
            Decision::Deny(reason) => {
                assert!(reason.contains("99"));
                assert!(reason.contains("restaurant 1"));
            }
            Decision::Allow => panic!("Expected deny"),
        }
    }

    #[test]
    fn test_missing_ownership_facts_deny() {
        let owner = IdentityContext::new(5, "owner@example.com", Role::Restaurante);
        let client = IdentityContext::new(10, "client@example.com", Role::Cliente);

        assert!(!OwnershipAuthorizer::authorize(
            &owner,
            Action::DeleteOrder,
            &AccessTarget::none()
        )
        .is_allowed());
        assert!(!OwnershipAuthorizer::authorize(
            &client,
            Action::ViewOrdersByClient,
            &AccessTarget::none()
        )
        .is_allowed());
    }

    #[test]
    fn test_admin_bypasses_ownership_but_cannot_create_orders() {
        let admin = IdentityContext::new(1, "admin@example.com", Role::Admin);
        assert!(OwnershipAuthorizer::authorize(
            &admin,
            Action::DeleteOrder,
            &AccessTarget::none()
        )
        .is_allowed());
        assert!(!OwnershipAuthorizer::authorize(
            &admin,
            Action::CreateOrder,
            &AccessTarget::none()
        )
        .is_allowed());
    }

    #[test]
    fn test_denied_keeps_reason_for_logs() {
        let client = IdentityContext::new(10, "client@example.com", Role::Cliente);
        match denied(&client, Action::CreateOrder, "not yours".to_string()) {
            OrderError::UnauthorizedAccess { reason } => assert_eq!(reason, "not yours"),
            other => panic!("Expected UnauthorizedAccess, got {:?}", other),
        }
    }

    #[test]
    fn test_require_maps_deny_to_unauthorized_access() {
        let client = IdentityContext::new(10, "client@example.com", Role::Cliente);
        let result = OwnershipAuthorizer::require(
            &client,
            Action::UpdateOrderStatus,
            &AccessTarget::restaurant(1, 5),
        );
        assert!(matches!(
            result,
            Err(OrderError::UnauthorizedAccess { .. })
        ));
    }
}
