//! Household points ledger.
//!
//! Children earn points from parents, spend them on rewards through a
//! parent-approved purchase workflow, and every change lands in an
//! append-only ledger. Balances are always derived, never stored.

pub use actor::Actor;
pub use balance::Balance;
pub use children::{Child, ChildProfile};
pub use commands::{PointsCmd, PurchaseListFilter};
pub use error::EngineError;
pub use ops::{Engine, EngineBuilder, LedgerSettings};
pub use purchases::{Purchase, PurchaseStatus};
pub use rewards::{Reward, RewardCategory, RewardOffer};
pub use transactions::{NewPointTransaction, PointTransaction, TransactionKind};

mod actor;
mod balance;
mod children;
mod commands;
mod error;
mod locks;
mod ops;
mod purchases;
mod rewards;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
