/// Contact resolution and persistence
pub mod resolver;
pub mod store;

pub use resolver::{ContactResolver, LookupAuth};
pub use store::ContactStore;

use serde::{Deserialize, Serialize};

/// A resolved address-book entry: the same shape as a verified identity, but
/// describing another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub email: String,
    pub alias: String,
}
