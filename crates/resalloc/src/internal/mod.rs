#[macro_use]
pub(crate) mod common;
pub mod configuration;
pub mod context;
pub mod graph;
pub mod jobspec;
pub mod ledger;
pub(crate) mod matcher;

#[cfg(test)]
pub mod tests;
