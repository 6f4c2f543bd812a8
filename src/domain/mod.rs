pub mod catalog;
pub mod customer;
pub mod soda;

pub use catalog::*;
pub use customer::*;
pub use soda::*;
