//! Ledger module: storage-backed members, expenses and settlement records

pub mod expense;
pub mod group;
pub mod member;
pub mod settlement;

pub use expense::*;
pub use group::*;
pub use member::*;
pub use settlement::*;
