//! One customer's walk through the machine, cash or SMS.
//!
//! The session owns the purchase state machine; the transaction client only
//! enforces the per-record rules.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::clients::TransactionClient;
use crate::error::{MachineError, MachineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseMode {
    /// Pay with inserted money; each purchase is debited.
    Cash,
    /// Order by SMS; the customer gets the default balance and is never debited.
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoCustomer,
    Funded,
    InventoryAdjusted,
    Done,
}

/// What a successful purchase leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub soda: String,
    pub price: i32,
    pub balance: Decimal,
    pub remaining: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Purchased(Receipt),
    NotEnoughMoney { balance: Decimal, price: i32 },
    SoldOut { soda: String },
}

pub struct Session {
    client: TransactionClient,
    customer_id: Uuid,
    mode: PurchaseMode,
    state: SessionState,
}

impl Session {
    /// Starts a session for a fresh customer id. SMS customers are created
    /// straight away with the default balance.
    #[instrument(skip(client))]
    pub async fn open(client: TransactionClient, mode: PurchaseMode) -> MachineResult<Self> {
        let customer_id = Uuid::new_v4();
        let mut session = Self {
            client,
            customer_id,
            mode,
            state: SessionState::NoCustomer,
        };
        if mode == PurchaseMode::Sms {
            session.client.add_customer(customer_id, None).await?;
            session.state = SessionState::Funded;
        }
        info!(customer_id = %customer_id, "Session opened");
        Ok(session)
    }

    #[allow(dead_code)]
    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn mode(&self) -> PurchaseMode {
        self.mode
    }

    #[allow(dead_code)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    /// Cash only. The first insert creates the customer, later ones top up.
    #[instrument(skip(self), fields(customer_id = %self.customer_id))]
    pub async fn insert_money(&mut self, amount: Decimal) -> MachineResult<Decimal> {
        if self.mode != PurchaseMode::Cash {
            return Err(MachineError::invalid("money is only accepted in cash mode"));
        }
        self.ensure_open()?;
        if amount <= Decimal::ZERO {
            return Err(MachineError::invalid(format!("amount must be more than zero, got {}", amount)));
        }

        let customer = match self.state {
            SessionState::NoCustomer => self.client.add_customer(self.customer_id, Some(amount)).await?,
            _ => self.client.add_money_to_customer(self.customer_id, amount).await?,
        };
        self.state = SessionState::Funded;
        Ok(customer.balance())
    }

    /// Buys one soda by name.
    ///
    /// Shortfalls in money or stock come back as outcomes, leaving every
    /// record untouched; only unexpected failures are errors.
    #[instrument(skip(self), fields(customer_id = %self.customer_id))]
    pub async fn select(&mut self, name: &str) -> MachineResult<SelectOutcome> {
        self.ensure_open()?;
        if self.state == SessionState::NoCustomer {
            return Err(MachineError::invalid("insert money before selecting"));
        }

        let soda = self.client.get_catalog_entry(name).await?;
        if self.mode == PurchaseMode::Cash {
            let balance = self.client.get_balance(self.customer_id).await;
            if balance < Decimal::from(soda.price()) {
                warn!(%balance, price = soda.price(), "Not enough money");
                return Ok(SelectOutcome::NotEnoughMoney { balance, price: soda.price() });
            }
        }
        if soda.quantity() <= 0 {
            warn!(soda = %soda.name(), "Sold out");
            return Ok(SelectOutcome::SoldOut { soda: soda.name().to_string() });
        }

        self.client.add_selection_to_customer(self.customer_id, soda.clone()).await?;
        if self.mode == PurchaseMode::Cash {
            self.client.settle_balance(self.customer_id).await?;
        }
        self.client.adjust_inventory(self.customer_id, &soda).await?;
        self.state = SessionState::InventoryAdjusted;

        let balance = self.client.get_balance(self.customer_id).await;
        let remaining = self.client.get_inventory_level(&soda).await?;
        let out_of_money = self.mode == PurchaseMode::Cash && balance <= Decimal::ZERO;
        if out_of_money || remaining <= 0 {
            self.state = SessionState::Done;
        }

        info!(soda = %soda.name(), %balance, remaining, "Purchase complete");
        Ok(SelectOutcome::Purchased(Receipt {
            soda: soda.name().to_string(),
            price: soda.price(),
            balance,
            remaining,
        }))
    }

    /// Ends the session and reports the money to hand back.
    #[instrument(skip(self), fields(customer_id = %self.customer_id))]
    pub async fn recall(self) -> Decimal {
        let balance = match self.mode {
            PurchaseMode::Cash => self.client.get_balance(self.customer_id).await,
            PurchaseMode::Sms => Decimal::ZERO,
        };
        info!(%balance, "Returning money");
        balance
    }

    fn ensure_open(&self) -> MachineResult<()> {
        if self.is_done() {
            return Err(MachineError::invalid("session is finished"));
        }
        Ok(())
    }
}
