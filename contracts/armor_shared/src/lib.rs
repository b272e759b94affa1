#![no_std]

//! Types and cross-contract interfaces shared by every Armor module.
//!
//! Modules never hold each other's addresses directly. They keep the address
//! of the master registry and resolve collaborators by logical name on every
//! call, so a module can be hot-swapped by re-registering its name.

mod error;
pub mod interfaces;
pub mod modules;
mod types;

pub use error::ArmorError;
pub use types::*;
