pub mod authorizer;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod metrics;
pub mod state_machine;
pub mod store;
pub mod validator;

pub use authorizer::{AccessTarget, Action, Decision, OwnershipAuthorizer};
pub use error::{OrderError, ValidationError};
pub use lifecycle::OrderLifecycleService;
pub use memory::{DirectorySeed, InMemoryDirectory, InMemoryOrderStore};
pub use state_machine::OrderStateMachine;
pub use store::{ClientLookup, OrderStore, ProductLookup, RestaurantLookup};
pub use validator::OrderValidator;
