//! Carton: Assembly Composition and Lifecycle
//!
//! Turns stored, declarative assemblies into provisionable cartons of boxes,
//! tracks their status and state, prices their resources and emits lifecycle
//! notifications.

pub mod account;
pub mod assembly;
pub mod carton;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod flavor;
pub mod handler;
pub mod lifecycle;
pub mod logging;
pub mod pairs;
pub mod payload;
pub mod provision;
pub mod store;
pub mod tooling;
