//! BOS (balance of system) slot-chain manager.
//!
//! This crate provides the domain core for ordering BOS equipment slots:
//!
//! - [`Chain`]: fixed-capacity, position-indexed slot list (main chain of 6,
//!   battery1/battery2/backup chains of 3).
//! - [`operations`]: insert-with-shift, remove-with-compaction, reorder.
//! - [`compaction`] and [`sms`]: canonical ordering and SMS pinning.
//! - [`document`]: the flat `bos_{sys}_type{N}_{attr}` field codec.
//! - [`DocumentStore`]: persistence seam, with [`InMemoryStore`].
//! - [`ChainManager`]: hydrates, mutates and persists one system's chains.

pub mod block_name;
pub mod chain;
pub mod compaction;
pub mod document;
pub mod error;
pub mod manager;
pub mod operations;
pub mod slot;
pub mod sms;
pub mod store;
pub mod system;
pub mod types;
pub mod visibility;

pub use chain::{Chain, ChainKind, PositionedSlot};
pub use error::CoreError;
pub use manager::{ChainManager, ChainView, SystemChains};
pub use operations::{Direction, InsertOrigin};
pub use slot::{EquipmentSlot, SlotPatch, Tier, TriggerSource};
pub use sms::{SmsEquipment, SmsPlacement};
pub use store::{DocumentStore, InMemoryStore};
pub use system::SystemNumber;
pub use types::{Document, ProjectId};
