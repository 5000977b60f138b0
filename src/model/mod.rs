//! Sample document schema: families with parents, children, pets and an address.

mod family;
pub mod fixtures;

pub use family::{Address, Child, Family, Parent, Pet};
pub use fixtures::{andersen_family, sample_families, wakefield_family};
