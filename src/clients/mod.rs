//! Typed clients over the record stores, plus the transaction client that
//! coordinates them.

#[macro_use]
mod macros;
pub mod customer_client;
pub mod soda_client;
pub mod transaction_client;

pub use customer_client::*;
pub use soda_client::*;
pub use transaction_client::*;
