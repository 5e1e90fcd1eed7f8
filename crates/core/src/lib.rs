//! Core types and helpers for agentmem
//!
//! Domain types shared by the storage engine and its adapters, plus the
//! pure text-processing pieces (redaction, hashing, learning extraction,
//! context formatting). Nothing here touches the database.

mod constants;
mod context;
mod env_config;
mod export;
mod observation;
mod relation;
mod session;
mod timeline;

pub use constants::*;
pub use context::*;
pub use env_config::*;
pub use export::*;
pub use observation::*;
pub use relation::*;
pub use session::*;
pub use timeline::*;
