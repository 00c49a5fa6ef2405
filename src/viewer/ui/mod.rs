//! UI rendering module

mod account;
mod instances;
mod layout;
mod metrics;
mod resources;
mod widgets;

pub use layout::render;
