use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::Soda;
use crate::error::{MachineError, MachineResult};

/// Client for the soda inventory store.
#[derive(Clone)]
pub struct SodaClient {
    inner: ResourceClient<Soda>,
}

crate::impl_basic_client!(SodaClient, Soda, soda);

impl SodaClient {
    /// Catalog entries are looked up by name; the first match wins.
    #[instrument(skip(self))]
    pub async fn find_soda_by_name(&self, name: &str) -> MachineResult<Soda> {
        debug!("Sending request");
        let wanted = name.to_string();
        self.inner.find(move |s: &Soda| s.name() == wanted).await?
            .ok_or_else(|| MachineError::not_found("soda", name))
    }

    #[instrument(skip(self))]
    pub async fn count_sodas(&self) -> MachineResult<usize> {
        debug!("Sending request");
        Ok(self.inner.count().await?)
    }
}
