// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod ledger;

pub use ledger::{ActionResult, LedgerService};
