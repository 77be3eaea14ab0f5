//! Application layer: wires the store to its services.

pub mod explorer;

pub use explorer::ExplorerApp;
