use tracing::{debug, instrument};
use uuid::Uuid;

use crate::actor_framework::ResourceClient;
use crate::domain::Customer;
use crate::error::{MachineError, MachineResult};

/// Client for the customer record store.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

crate::impl_basic_client!(CustomerClient, Customer, customer);

impl CustomerClient {
    /// Like `get_customer`, but a miss is `NotFound`.
    #[instrument(skip(self))]
    pub async fn require_customer(&self, id: Uuid) -> MachineResult<Customer> {
        debug!("Sending request");
        self.inner.find(move |c: &Customer| c.id() == id).await?
            .ok_or_else(|| MachineError::not_found("customer", id))
    }
}
