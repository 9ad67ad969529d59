//! Collaborator interfaces the lifecycle service depends on.
//!
//! Persistence and existence lookups live outside the core. Implementations
//! report outages as `anyhow::Error`; the core surfaces those as internal
//! failures and never retries them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Order, OrderFilter, OrderId, ProductId, RestaurantId, UserId, ValidOrder,
};

/// Resolves the owning user of a restaurant.
#[async_trait]
pub trait RestaurantLookup: Send + Sync {
    /// `Ok(None)` when the restaurant does not exist.
    async fn owner_id_of(&self, restaurant_id: RestaurantId) -> Result<Option<UserId>, anyhow::Error>;
}

#[async_trait]
pub trait ClientLookup: Send + Sync {
    async fn exists(&self, client_id: UserId) -> Result<bool, anyhow::Error>;
}

#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn exists(&self, product_id: ProductId) -> Result<bool, anyhow::Error>;
}

/// Order persistence.
///
/// Serializing concurrent updates to the same order is the store's job.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order, assigning its id.
    async fn create(&self, order: ValidOrder, now: DateTime<Utc>) -> Result<Order, anyhow::Error>;

    /// Overwrite an existing order. Returns `false` when no order with that
    /// id is stored.
    async fn save(&self, order: &Order) -> Result<bool, anyhow::Error>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, anyhow::Error>;

    async fn find_by_client(&self, client_id: UserId) -> Result<Vec<Order>, anyhow::Error>;

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, anyhow::Error>;

    /// Returns whether an order was removed.
    async fn delete(&self, id: OrderId) -> Result<bool, anyhow::Error>;
}
