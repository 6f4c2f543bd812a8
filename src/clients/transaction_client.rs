use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::app_system::SettlementMode;
use crate::clients::{CustomerClient, SodaClient};
use crate::domain::{Customer, Soda};
use crate::error::MachineResult;

/// Orchestrates purchases across the customer and soda stores.
///
/// Every mutation reads the current record, applies the checked change to a
/// copy, then swaps the copy in with a single delete+insert commit. A failed
/// check returns before anything is written.
#[derive(Clone)]
pub struct TransactionClient {
    customers: CustomerClient,
    sodas: SodaClient,
    default_balance: Decimal,
    mode: SettlementMode,
}

impl TransactionClient {
    pub fn new(
        customers: CustomerClient,
        sodas: SodaClient,
        default_balance: Decimal,
        mode: SettlementMode,
    ) -> Self {
        Self {
            customers,
            sodas,
            default_balance,
            mode,
        }
    }

    /// Returns the stored customer if `id` is known, otherwise creates one with
    /// `money` (or the configured default balance).
    #[instrument(skip(self))]
    pub async fn add_customer(&self, id: Uuid, money: Option<Decimal>) -> MachineResult<Customer> {
        if let Some(existing) = self.customers.get_customer(id).await? {
            debug!("Customer already present");
            return Ok(existing);
        }
        let customer = Customer::new(id, money.unwrap_or(self.default_balance))?;
        self.customers.insert_customer(customer.clone()).await?;
        info!(balance = %customer.balance(), "Customer created");
        Ok(customer)
    }

    #[instrument(skip(self))]
    #[allow(dead_code)]
    pub async fn get_customer(&self, id: Uuid) -> MachineResult<Customer> {
        self.customers.require_customer(id).await
    }

    #[instrument(skip(self, soda), fields(soda = %soda.name()))]
    pub async fn add_selection_to_customer(&self, id: Uuid, soda: Soda) -> MachineResult<Customer> {
        let current = self.customers.require_customer(id).await?;
        let mut next = current.clone();
        next.add_selection(soda);
        self.customers.replace_customer(&current, next.clone()).await?;
        debug!(selections = next.selections().len(), "Selection added");
        Ok(next)
    }

    /// Tops up an existing customer's balance.
    #[instrument(skip(self))]
    pub async fn add_money_to_customer(&self, id: Uuid, amount: Decimal) -> MachineResult<Customer> {
        let current = self.customers.require_customer(id).await?;
        let mut next = current.clone();
        next.add_money(amount)?;
        self.customers.replace_customer(&current, next.clone()).await?;
        info!(balance = %next.balance(), "Money added");
        Ok(next)
    }

    /// Debits the price of each pending selection, one item at a time.
    #[instrument(skip(self))]
    pub async fn settle_balance(&self, id: Uuid) -> MachineResult<()> {
        let current = self.customers.require_customer(id).await?;
        let prices: Vec<Decimal> = self.settlement_pending(&current)
            .iter()
            .map(|soda| Decimal::from(soda.price()))
            .collect();
        if prices.is_empty() {
            debug!("Nothing to settle");
            return Ok(());
        }

        let mut next = current.clone();
        for price in &prices {
            next.debit_money(*price)?;
        }
        next.mark_settled();
        let balance = next.balance();
        self.customers.replace_customer(&current, next).await?;
        info!(items = prices.len(), %balance, "Balance settled");
        Ok(())
    }

    /// Balance lookup that never fails the caller: unknown customers have zero.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, id: Uuid) -> Decimal {
        match self.customers.get_customer(id).await {
            Ok(Some(customer)) => customer.balance(),
            Ok(None) => {
                debug!("Customer not found, reporting zero balance");
                Decimal::ZERO
            }
            Err(e) => {
                warn!(error = %e, "Balance lookup failed, reporting zero balance");
                Decimal::ZERO
            }
        }
    }

    /// Takes one unit of `soda` out of stock for every pending selection of the
    /// customer, whatever product those selections are.
    ///
    /// In incremental mode the stock and the dispensed cursor live in two
    /// stores; if the cursor write fails the stock write is undone.
    #[instrument(skip(self, soda), fields(soda = %soda.name()))]
    pub async fn adjust_inventory(&self, customer_id: Uuid, soda: &Soda) -> MachineResult<()> {
        let customer = self.customers.require_customer(customer_id).await?;
        let current = self.sodas.find_soda_by_name(soda.name()).await?;
        let pending = self.dispense_pending(&customer).len();
        if pending == 0 {
            debug!("Nothing to dispense");
            return Ok(());
        }

        let mut next = current.clone();
        for _ in 0..pending {
            next.remove_quantity(1)?;
        }
        let remaining = next.quantity();
        self.sodas.replace_soda(&current, next.clone()).await?;

        if self.mode == SettlementMode::Incremental {
            let mut dispensed = customer.clone();
            dispensed.mark_dispensed();
            if let Err(e) = self.customers.replace_customer(&customer, dispensed).await {
                // The cursor did not move, so the stock must not stay decremented either.
                warn!(error = %e, "Dispensed cursor not saved, restoring stock");
                self.sodas.replace_soda(&next, current).await?;
                return Err(e);
            }
        }
        info!(items = pending, remaining, "Inventory adjusted");
        Ok(())
    }

    #[instrument(skip(self, soda), fields(soda = %soda.name()))]
    pub async fn get_inventory_level(&self, soda: &Soda) -> MachineResult<i32> {
        Ok(self.sodas.find_soda_by_name(soda.name()).await?.quantity())
    }

    #[instrument(skip(self))]
    pub async fn get_catalog_entry(&self, name: &str) -> MachineResult<Soda> {
        self.sodas.find_soda_by_name(name).await
    }

    fn settlement_pending<'a>(&self, customer: &'a Customer) -> &'a [Soda] {
        match self.mode {
            SettlementMode::Cumulative => customer.selections(),
            SettlementMode::Incremental => customer.unsettled(),
        }
    }

    fn dispense_pending<'a>(&self, customer: &'a Customer) -> &'a [Soda] {
        match self.mode {
            SettlementMode::Cumulative => customer.selections(),
            SettlementMode::Incremental => customer.undispensed(),
        }
    }
}

