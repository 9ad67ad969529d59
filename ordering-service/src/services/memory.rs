//! In-memory collaborators.
//!
//! Back the binary when no external store is wired in, and the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use super::store::{ClientLookup, OrderStore, ProductLookup, RestaurantLookup};
use crate::models::{
    Order, OrderFilter, OrderId, ProductId, RestaurantId, UserId, ValidOrder,
};

/// Order store keyed by id, with ids handed out from 1 upwards.
#[derive(Debug)]
pub struct InMemoryOrderStore {
    orders: DashMap<OrderId, Order>,
    next_id: AtomicI64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn collect_sorted(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|order| order.id);
        orders
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: ValidOrder, now: DateTime<Utc>) -> Result<Order, anyhow::Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let order = order.into_order(id, now);
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn save(&self, order: &Order) -> Result<bool, anyhow::Error> {
        match self.orders.get_mut(&order.id) {
            Some(mut existing) => {
                *existing = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, anyhow::Error> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_client(&self, client_id: UserId) -> Result<Vec<Order>, anyhow::Error> {
        Ok(self.collect_sorted(|order| order.client_id == client_id))
    }

    async fn find_by_restaurant(
        &self,
        restaurant_id: RestaurantId,
        filter: &OrderFilter,
    ) -> Result<Vec<Order>, anyhow::Error> {
        Ok(self.collect_sorted(|order| {
            order.restaurant_id == restaurant_id && filter.matches(order)
        }))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, anyhow::Error> {
        Ok(self.orders.remove(&id).is_some())
    }
}

/// Seed file format for [`InMemoryDirectory`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub restaurants: Vec<RestaurantSeed>,
    #[serde(default)]
    pub clients: Vec<UserId>,
    #[serde(default)]
    pub products: Vec<ProductId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantSeed {
    pub id: RestaurantId,
    pub owner_id: UserId,
}

/// Restaurants, clients and products known to exist.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    restaurants: HashMap<RestaurantId, UserId>,
    clients: HashSet<UserId>,
    products: HashSet<ProductId>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restaurant(mut self, restaurant_id: RestaurantId, owner_id: UserId) -> Self {
        self.restaurants.insert(restaurant_id, owner_id);
        self
    }

    pub fn with_client(mut self, client_id: UserId) -> Self {
        self.clients.insert(client_id);
        self
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.products.insert(product_id);
        self
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            restaurants: seed
                .restaurants
                .into_iter()
                .map(|r| (r.id, r.owner_id))
                .collect(),
            clients: seed.clients.into_iter().collect(),
            products: seed.products.into_iter().collect(),
        }
    }

    /// Load a JSON seed file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read seed file {}: {}", path.display(), e))?;
        let seed: DirectorySeed = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid seed file {}: {}", path.display(), e))?;

        tracing::info!(
            restaurants = seed.restaurants.len(),
            clients = seed.clients.len(),
            products = seed.products.len(),
            "Directory seeded"
        );

        Ok(Self::from_seed(seed))
    }
}

#[async_trait]
impl RestaurantLookup for InMemoryDirectory {
    async fn owner_id_of(&self, restaurant_id: RestaurantId) -> Result<Option<UserId>, anyhow::Error> {
        Ok(self.restaurants.get(&restaurant_id).copied())
    }
}

#[async_trait]
impl ClientLookup for InMemoryDirectory {
    async fn exists(&self, client_id: UserId) -> Result<bool, anyhow::Error> {
        Ok(self.clients.contains(&client_id))
    }
}

#[async_trait]
impl ProductLookup for InMemoryDirectory {
    async fn exists(&self, product_id: ProductId) -> Result<bool, anyhow::Error> {
        Ok(self.products.contains(&product_id))
    }
}
