//! Address book entities.

pub mod address;
pub mod label;

pub use address::{Address, AddressFields, AddressId, EditField};
pub use label::{Association, Label};
