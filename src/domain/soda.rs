use uuid::Uuid;

use crate::actor_framework::Entity;
use crate::error::{MachineError, MachineResult};

/// A catalog entry: one kind of soda with its stock and unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soda {
    id: Uuid,
    name: String,
    quantity: i32,
    price: i32,
}

impl Soda {
    /// Creates a new catalog entry.
    ///
    /// # Errors
    /// `InvalidArgument` if the name is blank, or quantity or price is not positive.
    pub fn new(id: Uuid, name: impl Into<String>, quantity: i32, price: i32) -> MachineResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MachineError::invalid("name must not be blank"));
        }
        if quantity <= 0 {
            return Err(MachineError::invalid(format!("quantity must be positive, got {}", quantity)));
        }
        if price <= 0 {
            return Err(MachineError::invalid(format!("price must be positive, got {}", price)));
        }
        Ok(Self { id, name, quantity, price })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn price(&self) -> i32 {
        self.price
    }

    /// Restocks by `amount`. Zero is rejected.
    pub fn add_quantity(&mut self, amount: i32) -> MachineResult<()> {
        if amount == 0 {
            return Err(MachineError::invalid("quantity to add must not be zero"));
        }
        self.quantity = self.quantity.checked_add(amount)
            .ok_or_else(|| MachineError::invalid(format!("quantity cannot hold {} more", amount)))?;
        Ok(())
    }

    /// Takes `amount` out of stock.
    ///
    /// Only the stock *before* removal is checked: anything above zero lets the
    /// removal through, even if it leaves the quantity negative.
    pub fn remove_quantity(&mut self, amount: i32) -> MachineResult<()> {
        if amount == 0 {
            return Err(MachineError::invalid("quantity to remove must not be zero"));
        }
        if self.quantity <= 0 {
            return Err(MachineError::OutOfStock);
        }
        self.quantity = self.quantity.checked_sub(amount)
            .ok_or_else(|| MachineError::invalid(format!("quantity cannot be reduced by {}", amount)))?;
        Ok(())
    }
}

impl Entity for Soda {
    type Id = Uuid;
    const KIND: &'static str = "soda";

    fn id(&self) -> &Uuid {
        &self.id
    }
}
