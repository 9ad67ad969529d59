//! Order lifecycle orchestration.
//!
//! Every operation takes the caller's identity explicitly. Flow for
//! mutations: class-level authorization, payload validation, load, instance
//! authorization, state computation, persistence. Nothing here retries.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn, Span};

use super::authorizer::{denied, AccessTarget, Action, OwnershipAuthorizer};
use super::error::{OrderError, ValidationError};
use super::metrics::{
    ERRORS_TOTAL, OPERATION_DURATION, ORDERS_CREATED_TOTAL, ORDERS_DELETED_TOTAL,
    STATUS_TRANSITIONS_TOTAL,
};
use super::state_machine::OrderStateMachine;
use super::store::{ClientLookup, OrderStore, ProductLookup, RestaurantLookup};
use super::validator::OrderValidator;
use crate::models::{
    IdentityContext, Order, OrderFilter, OrderId, OrderRequest, OrderStatus, RestaurantId, Role,
    UserId,
};

/// Orchestrates validator, authorizer, state machine and collaborators.
#[derive(Clone)]
pub struct OrderLifecycleService {
    orders: Arc<dyn OrderStore>,
    restaurants: Arc<dyn RestaurantLookup>,
    clients: Arc<dyn ClientLookup>,
    products: Arc<dyn ProductLookup>,
}

impl OrderLifecycleService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        restaurants: Arc<dyn RestaurantLookup>,
        clients: Arc<dyn ClientLookup>,
        products: Arc<dyn ProductLookup>,
    ) -> Self {
        Self {
            orders,
            restaurants,
            clients,
            products,
        }
    }

    /// Place a new order on behalf of the calling client.
    ///
    /// The created order is always `pendiente`, with `created_at ==
    /// updated_at`.
    #[instrument(
        skip(self, identity, request),
        fields(
            actor = identity.subject_id(),
            restaurant_id = request.restaurant_id,
            order_id
        )
    )]
    pub async fn create_order(
        &self,
        identity: &IdentityContext,
        request: &OrderRequest,
    ) -> Result<Order, OrderError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["create_order"])
            .start_timer();
        record(self.try_create_order(identity, request).await)
    }

    /// Move an order to `new_status`, optionally replacing its comments.
    ///
    /// Requesting the current status succeeds without changing it and still
    /// refreshes `updated_at`.
    #[instrument(skip(self, identity, comments), fields(actor = identity.subject_id()))]
    pub async fn update_order_status(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
        new_status: OrderStatus,
        comments: Option<String>,
    ) -> Result<Order, OrderError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["update_order_status"])
            .start_timer();
        record(
            self.try_update_order_status(identity, order_id, new_status, comments)
                .await,
        )
    }

    /// Remove an order. Any status may be deleted by the restaurant owner.
    #[instrument(skip(self, identity), fields(actor = identity.subject_id()))]
    pub async fn delete_order(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
    ) -> Result<(), OrderError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["delete_order"])
            .start_timer();
        record(self.try_delete_order(identity, order_id).await)
    }

    #[instrument(skip(self, identity), fields(actor = identity.subject_id()))]
    pub async fn find_order(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        record(self.try_find_order(identity, order_id).await)
    }

    #[instrument(skip(self, identity), fields(actor = identity.subject_id()))]
    pub async fn find_orders_by_client(
        &self,
        identity: &IdentityContext,
        client_id: UserId,
    ) -> Result<Vec<Order>, OrderError> {
        record(self.try_find_orders_by_client(identity, client_id).await)
    }

    /// All orders of a restaurant.
    pub async fn find_orders_by_owner(
        &self,
        identity: &IdentityContext,
        restaurant_id: RestaurantId,
    ) -> Result<Vec<Order>, OrderError> {
        self.find_orders_by_restaurant(identity, restaurant_id, &OrderFilter::default())
            .await
    }

    pub async fn find_orders_by_status(
        &self,
        identity: &IdentityContext,
        restaurant_id: RestaurantId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, OrderError> {
        let filter = OrderFilter {
            status: Some(status),
            ..Default::default()
        };
        self.find_orders_by_restaurant(identity, restaurant_id, &filter)
            .await
    }

    /// Orders created within `[from, to]`, both ends inclusive.
    pub async fn find_orders_by_date_range(
        &self,
        identity: &IdentityContext,
        restaurant_id: RestaurantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderError> {
        let filter = OrderFilter {
            status: None,
            from: Some(from),
            to: Some(to),
        };
        self.find_orders_by_restaurant(identity, restaurant_id, &filter)
            .await
    }

    /// Restaurant-scoped query; the filter's criteria combine with AND.
    #[instrument(skip(self, identity, filter), fields(actor = identity.subject_id()))]
    pub async fn find_orders_by_restaurant(
        &self,
        identity: &IdentityContext,
        restaurant_id: RestaurantId,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, OrderError> {
        record(
            self.try_find_orders_by_restaurant(identity, restaurant_id, filter)
                .await,
        )
    }

    async fn try_create_order(
        &self,
        identity: &IdentityContext,
        request: &OrderRequest,
    ) -> Result<Order, OrderError> {
        OwnershipAuthorizer::require(identity, Action::CreateOrder, &AccessTarget::none())?;

        let valid = OrderValidator::validate(request)?;

        if identity.subject_id() != valid.client_id() {
            return Err(denied(
                identity,
                Action::CreateOrder,
                format!(
                    "subject {} may not order on behalf of client {}",
                    identity.subject_id(),
                    valid.client_id()
                ),
            ));
        }

        self.owner_of(valid.restaurant_id())
            .await?
            .ok_or(OrderError::RestaurantNotFound(valid.restaurant_id()))?;

        let client_exists = self
            .clients
            .exists(valid.client_id())
            .await
            .map_err(|e| internal("client lookup", e))?;
        if !client_exists {
            return Err(OrderError::ClientNotFound(valid.client_id()));
        }

        let product_ids: BTreeSet<_> = valid.lines().iter().map(|line| line.product_id).collect();
        for product_id in product_ids {
            let exists = self
                .products
                .exists(product_id)
                .await
                .map_err(|e| internal("product lookup", e))?;
            if !exists {
                return Err(OrderError::ProductNotFound(product_id));
            }
        }

        let order = self
            .orders
            .create(valid, Utc::now())
            .await
            .map_err(|e| internal("order create", e))?;

        Span::current().record("order_id", order.id);
        ORDERS_CREATED_TOTAL.inc();
        info!(
            order_id = order.id,
            client_id = order.client_id,
            restaurant_id = order.restaurant_id,
            total = %order.total,
            "Order created"
        );

        Ok(order)
    }

    async fn try_update_order_status(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
        new_status: OrderStatus,
        comments: Option<String>,
    ) -> Result<Order, OrderError> {
        let current = self.load(order_id).await?;
        let target = self.target_of(&current).await?;
        OwnershipAuthorizer::require(identity, Action::UpdateOrderStatus, &target)?;

        let next = OrderStateMachine::transition(current.status, new_status, identity)?;
        let updated = current.with_status(next, comments, Utc::now());

        let saved = self
            .orders
            .save(&updated)
            .await
            .map_err(|e| internal("order save", e))?;
        // Deleted between load and save
        if !saved {
            return Err(OrderError::OrderNotFound(order_id));
        }

        if next != current.status {
            STATUS_TRANSITIONS_TOTAL
                .with_label_values(&[current.status.as_str(), next.as_str()])
                .inc();
        }
        info!(
            order_id,
            actor = identity.subject_id(),
            from = %current.status,
            to = %next,
            "Order status updated"
        );

        Ok(updated)
    }

    async fn try_delete_order(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
    ) -> Result<(), OrderError> {
        let current = self.load(order_id).await?;
        let target = self.target_of(&current).await?;
        OwnershipAuthorizer::require(identity, Action::DeleteOrder, &target)?;

        let removed = self
            .orders
            .delete(order_id)
            .await
            .map_err(|e| internal("order delete", e))?;
        if !removed {
            return Err(OrderError::OrderNotFound(order_id));
        }

        ORDERS_DELETED_TOTAL.inc();
        info!(
            order_id,
            actor = identity.subject_id(),
            status = %current.status,
            "Order deleted"
        );
        Ok(())
    }

    async fn try_find_order(
        &self,
        identity: &IdentityContext,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        let order = self.load(order_id).await?;
        let target = self.target_of(&order).await?;
        OwnershipAuthorizer::require(identity, Action::ViewOrder, &target)?;
        Ok(order)
    }

    async fn try_find_orders_by_client(
        &self,
        identity: &IdentityContext,
        client_id: UserId,
    ) -> Result<Vec<Order>, OrderError> {
        OwnershipAuthorizer::require(
            identity,
            Action::ViewOrdersByClient,
            &AccessTarget::client(client_id),
        )?;
        self.orders
            .find_by_client(client_id)
            .await
            .map_err(|e| internal("order query", e))
    }

    async fn try_find_orders_by_restaurant(
        &self,
        identity: &IdentityContext,
        restaurant_id: RestaurantId,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, OrderError> {
        // Roles that can never list a restaurant's orders are turned away
        // before the restaurant is resolved.
        if identity.role() != Role::Restaurante {
            OwnershipAuthorizer::require(
                identity,
                Action::ViewOrdersByRestaurant,
                &AccessTarget::none(),
            )?;
        }

        let owner = self
            .owner_of(restaurant_id)
            .await?
            .ok_or(OrderError::RestaurantNotFound(restaurant_id))?;
        OwnershipAuthorizer::require(
            identity,
            Action::ViewOrdersByRestaurant,
            &AccessTarget::restaurant(restaurant_id, owner),
        )?;

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ValidationError::InvalidDateRange.into());
            }
        }

        self.orders
            .find_by_restaurant(restaurant_id, filter)
            .await
            .map_err(|e| internal("order query", e))
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(order_id)
            .await
            .map_err(|e| internal("order lookup", e))?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    async fn owner_of(&self, restaurant_id: RestaurantId) -> Result<Option<UserId>, OrderError> {
        self.restaurants
            .owner_id_of(restaurant_id)
            .await
            .map_err(|e| internal("restaurant lookup", e))
    }

    /// Ownership facts for an existing order. A restaurant that has since
    /// disappeared leaves the owner unset, which only ADMIN and the client
    /// get past.
    async fn target_of(&self, order: &Order) -> Result<AccessTarget, OrderError> {
        let owner = self.owner_of(order.restaurant_id).await?;
        if owner.is_none() {
            warn!(
                order_id = order.id,
                restaurant_id = order.restaurant_id,
                "Order references a missing restaurant"
            );
        }
        Ok(AccessTarget {
            owner_user_id: owner,
            client_id: Some(order.client_id),
            restaurant_id: Some(order.restaurant_id),
        })
    }
}

/// Count failures by kind on their way out.
fn record<T>(result: Result<T, OrderError>) -> Result<T, OrderError> {
    if let Err(e) = &result {
        ERRORS_TOTAL.with_label_values(&[e.kind()]).inc();
    }
    result
}

fn internal(operation: &str, err: anyhow::Error) -> OrderError {
    error!(operation, error = %err, "Collaborator failure");
    OrderError::InternalFailure(err.context(format!("{} failed", operation)))
}
