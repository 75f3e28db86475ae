//! pricefuse: hybrid price oracle, rule-based signal fusion and a
//! paper-trading ledger.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`quote_service`] joins the two
//! price feeds before the resolver runs.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod quote_service;
