//! `Kestrel` memory infrastructure.
//!
//! This crate provides the storage primitives shared by the Kestrel
//! compiler crates:
//!
//! - **Arena allocation**: a thread-safe bump allocator for data that lives
//!   as long as the process (interned string bytes)
//! - **Symbols**: `Copy` handles to interned strings with O(1) equality,
//!   valid across every type environment of the process

pub mod arena;
pub mod interner;
pub mod symbol;

pub use arena::{ArenaAllocError, ArenaStats, GlobalArena, global_arena};
pub use interner::{SymbolTable, symbol_table};
pub use symbol::{Symbol, well_known};
