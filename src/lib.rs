//! # Group Split Core
//!
//! Expense splitting for groups: share allocation, per-member net balances
//! and settlement suggestions.
//!
//! ## Features
//!
//! - **Share allocation**: equal, exact and percentage splits in integer cents
//! - **Balances**: total paid, total owed and net position for every member
//! - **Settlement suggestions**: greedy debtor/creditor matching
//! - **Settlement records**: pending/completed payment workflow
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use group_split_core::{BalanceEngine, ExpenseBuilder, GroupId, Member, Money, SplitRule};
//! use chrono::NaiveDate;
//!
//! let group = GroupId::new();
//! let alice = Member::registered("Alice", None);
//! let bob = Member::guest("Bob");
//!
//! let dinner = ExpenseBuilder::new(
//!     group,
//!     alice.id(),
//!     "Dinner".to_string(),
//!     Money::from_cents(4000),
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//! )
//! .split(SplitRule::Equal(vec![alice.id(), bob.id()]))
//! .build()
//! .unwrap();
//!
//! let report = BalanceEngine::default().summarize(&[alice, bob], &[dinner]);
//! assert_eq!(report.transfers[0].amount, Money::from_cents(2000));
//! ```

pub mod engine;
pub mod ledger;
pub mod money;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use engine::{
    allocate_shares, check_share_total, compute_balances, match_settlements, BalanceEngine,
    BalanceSheet, GroupBalanceReport, LedgerWarning, MemberBalance, SettlementPlan,
    SettlementTransfer, ShareAllocation, SplitRule,
};
pub use ledger::{ExpenseBuilder, ExpenseManager, GroupLedger, MemberManager, SettlementManager};
pub use money::Money;
pub use settings::EngineSettings;
pub use traits::*;
pub use types::*;

// Re-export expense patterns for convenience
pub use ledger::expense::patterns;
