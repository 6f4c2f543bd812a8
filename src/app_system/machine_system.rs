use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::actor_framework::{ResourceActor, ResourceClient};
use crate::app_system::MachineConfig;
use crate::clients::{CustomerClient, SodaClient, TransactionClient};
use crate::domain::{CatalogEntry, Customer, Soda};
use crate::error::{MachineError, MachineResult};

/// The running machine: record store actors, their clients, and seeded stock.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct SodaMachineSystem {
    pub transaction_client: TransactionClient,
    pub soda_client: SodaClient,
    customer_store: ResourceClient<Customer>,
    soda_store: ResourceClient<Soda>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl SodaMachineSystem {
    /// Spawns the stores and seeds the catalog from `config`.
    #[instrument(skip(config))]
    pub async fn start(config: &MachineConfig) -> MachineResult<Self> {
        info!("Starting soda machine");

        let (customer_actor, customer_resource_client) =
            ResourceActor::<Customer>::new(config.channel_buffer);
        let customer_store = customer_resource_client.clone();
        let customer_client = CustomerClient::new(customer_resource_client);
        let customer_handle = tokio::spawn(customer_actor.run());

        let (soda_actor, soda_resource_client) = ResourceActor::<Soda>::new(config.channel_buffer);
        let soda_store = soda_resource_client.clone();
        let soda_client = SodaClient::new(soda_resource_client);
        let soda_handle = tokio::spawn(soda_actor.run());

        let transaction_client = TransactionClient::new(
            customer_client,
            soda_client.clone(),
            config.default_balance,
            config.settlement_mode,
        );

        let system = Self {
            transaction_client,
            soda_client,
            customer_store,
            soda_store,
            handles: vec![customer_handle, soda_handle],
        };
        system.seed(&config.catalog).await?;
        Ok(system)
    }

    /// Inserts each catalog entry; a name that is already stocked is topped up instead.
    async fn seed(&self, catalog: &[CatalogEntry]) -> MachineResult<()> {
        for entry in catalog {
            match self.soda_client.find_soda_by_name(&entry.name).await {
                Ok(current) => {
                    let mut restocked = current.clone();
                    restocked.add_quantity(entry.quantity)?;
                    self.soda_client.replace_soda(&current, restocked).await?;
                }
                Err(MachineError::NotFound { .. }) => {
                    let soda = Soda::new(Uuid::new_v4(), entry.name.as_str(), entry.quantity, entry.price)?;
                    self.soda_client.insert_soda(soda).await?;
                }
                Err(e) => return Err(e),
            }
        }
        let inventory_count = self.soda_client.count_sodas().await?;
        info!(inventory_count, "Catalog seeded");
        Ok(())
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down soda machine...");
        // Clones handed out earlier may still be alive, so stop the stores explicitly.
        self.customer_store.close().await;
        self.soda_store.close().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::actor_framework::FrameworkError;
    use crate::domain::{COKE, SPRITE};

    #[tokio::test]
    async fn test_start_seeds_default_catalog() {
        let system = SodaMachineSystem::start(&MachineConfig::default()).await.unwrap();
        assert_eq!(system.soda_client.count_sodas().await.unwrap(), 3);

        let coke = system.transaction_client.get_catalog_entry(COKE).await.unwrap();
        assert_eq!((coke.quantity(), coke.price()), (50, 5));
        let sprite = system.transaction_client.get_catalog_entry(SPRITE).await.unwrap();
        assert_eq!((sprite.quantity(), sprite.price()), (15, 3));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_catalog_names_are_merged() {
        let config = MachineConfig {
            catalog: vec![CatalogEntry::new(COKE, 5, 5), CatalogEntry::new(COKE, 3, 9)],
            ..MachineConfig::default()
        };
        let system = SodaMachineSystem::start(&config).await.unwrap();
        assert_eq!(system.soda_client.count_sodas().await.unwrap(), 1);

        let coke = system.transaction_client.get_catalog_entry(COKE).await.unwrap();
        assert_eq!(coke.quantity(), 8);
        assert_eq!(coke.price(), 5);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_finishes_while_clients_are_held() {
        let system = SodaMachineSystem::start(&MachineConfig::default()).await.unwrap();
        let client = system.transaction_client.clone();

        tokio::time::timeout(Duration::from_secs(5), system.shutdown())
            .await
            .expect("shutdown should not wait for outstanding clients")
            .unwrap();

        assert_eq!(
            client.get_catalog_entry(COKE).await,
            Err(MachineError::Store(FrameworkError::ActorClosed))
        );
        assert_eq!(client.get_balance(Uuid::new_v4()).await, rust_decimal::Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_restock_overflow_fails_startup() {
        let config = MachineConfig {
            catalog: vec![CatalogEntry::new(COKE, i32::MAX, 5), CatalogEntry::new(COKE, 1, 5)],
            ..MachineConfig::default()
        };
        let err = SodaMachineSystem::start(&config).await.err().unwrap();
        assert!(matches!(err, MachineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_invalid_catalog_entry_fails_startup() {
        let config = MachineConfig {
            catalog: vec![CatalogEntry::new(COKE, 0, 5)],
            ..MachineConfig::default()
        };
        assert!(SodaMachineSystem::start(&config).await.is_err());
    }
}
