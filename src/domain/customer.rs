use rust_decimal::Decimal;
use uuid::Uuid;

use crate::actor_framework::Entity;
use crate::domain::Soda;
use crate::error::{MachineError, MachineResult};

/// A customer session: money inserted and the sodas picked so far.
///
/// `settled` and `dispensed` count the leading selections that have already
/// been paid for and taken out of stock.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: Uuid,
    balance: Decimal,
    selections: Vec<Soda>,
    settled: usize,
    dispensed: usize,
}

impl Customer {
    /// Creates a customer with an empty selection list.
    ///
    /// # Errors
    /// `InvalidArgument` if `id` is nil or `balance` is negative.
    pub fn new(id: Uuid, balance: Decimal) -> MachineResult<Self> {
        if id.is_nil() {
            return Err(MachineError::invalid("customer id must not be nil"));
        }
        if balance < Decimal::ZERO {
            return Err(MachineError::invalid(format!("balance must not be negative, got {}", balance)));
        }
        Ok(Self {
            id,
            balance,
            selections: Vec::new(),
            settled: 0,
            dispensed: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn selections(&self) -> &[Soda] {
        &self.selections
    }

    /// Selections not yet debited.
    pub fn unsettled(&self) -> &[Soda] {
        &self.selections[self.settled.min(self.selections.len())..]
    }

    /// Selections not yet taken out of stock.
    pub fn undispensed(&self) -> &[Soda] {
        &self.selections[self.dispensed.min(self.selections.len())..]
    }

    pub fn add_money(&mut self, amount: Decimal) -> MachineResult<()> {
        if amount < Decimal::ZERO {
            return Err(MachineError::invalid(format!("amount must not be negative, got {}", amount)));
        }
        self.balance = self.balance.checked_add(amount)
            .ok_or_else(|| MachineError::invalid(format!("balance cannot hold {} more", amount)))?;
        Ok(())
    }

    /// Debits `amount` from the balance.
    ///
    /// Fails with `InsufficientFunds` when the balance is already at or below
    /// zero. The balance itself is not compared against `amount`.
    pub fn debit_money(&mut self, amount: Decimal) -> MachineResult<()> {
        if amount < Decimal::ZERO {
            return Err(MachineError::invalid(format!("amount must not be negative, got {}", amount)));
        }
        if self.balance <= Decimal::ZERO {
            return Err(MachineError::InsufficientFunds);
        }
        self.balance = self.balance.checked_sub(amount)
            .ok_or_else(|| MachineError::invalid(format!("balance cannot be debited by {}", amount)))?;
        Ok(())
    }

    pub fn add_selection(&mut self, soda: Soda) {
        self.selections.push(soda);
    }

    /// Removes the first selection with the same id as `soda`.
    ///
    /// Returns whether an entry was removed.
    #[allow(dead_code)]
    pub fn remove_selection(&mut self, soda: &Soda) -> MachineResult<bool> {
        if self.selections.is_empty() {
            return Err(MachineError::EmptySelection);
        }
        match self.selections.iter().position(|s| s.id() == soda.id()) {
            Some(index) => {
                self.selections.remove(index);
                if index < self.settled {
                    self.settled -= 1;
                }
                if index < self.dispensed {
                    self.dispensed -= 1;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn mark_settled(&mut self) {
        self.settled = self.selections.len();
    }

    pub fn mark_dispensed(&mut self) {
        self.dispensed = self.selections.len();
    }
}

impl Entity for Customer {
    type Id = Uuid;
    const KIND: &'static str = "customer";

    fn id(&self) -> &Uuid {
        &self.id
    }
}
