mod amounts;
mod api;
mod cli;
mod clock;
mod contract;
mod dates;
mod error;
mod ledger;
mod payment;
mod periodicity;
mod schedule;
mod settlement;
mod vault;

use crate::cli::ledger_operation;
fn main() {
    ledger_operation()
}
