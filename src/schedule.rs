use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::contract::{Contract, LeaseTerms};
use crate::dates::day_key;
use crate::ledger::Ledger;
use crate::payment::{LedgerEntry, PaymentStatus, RealPayment, SimulatedPayment};

/// Upper bound on the simulated obligations of a single projection, whatever the cadence
pub const SIMULATION_CAP: usize = 24;

/// Merges the payments recorded for a contract with the obligations its terms
/// still imply, ordered by due date.
///
/// Missing or malformed contract fields resolve to defaults, so this never fails.
pub fn project(contract: &Contract, real_payments: &[RealPayment], today: &NaiveDate) -> Ledger {
    let terms = contract.terms(today);
    let simulated = simulate(&terms, real_payments, today);

    debug!(
        contract = ?terms.contract_id,
        real = real_payments.len(),
        simulated = simulated.len(),
        "Projected payment ledger"
    );

    let mut entries: Vec<LedgerEntry> = real_payments
        .iter()
        .cloned()
        .map(LedgerEntry::Real)
        .chain(simulated.into_iter().map(LedgerEntry::Simulated))
        .collect();

    // Stable, so real payments sharing a due date keep their order
    entries.sort_by(|left, right| left.due_date().cmp(right.due_date()));

    Ledger::new(entries)
}

fn simulate(terms: &LeaseTerms, real_payments: &[RealPayment], today: &NaiveDate) -> Vec<SimulatedPayment> {
    let covered: HashSet<String> = real_payments
        .iter()
        .map(|payment| day_key(&payment.date_echeance))
        .collect();

    let mut simulated = Vec::new();
    let mut step: u32 = 0;

    while simulated.len() < SIMULATION_CAP {
        let due = match terms.periodicity.slot(&terms.start, step) {
            Some(due) if due <= terms.end => due,
            _ => break,
        };

        if !covered.contains(&day_key(&due)) {
            simulated.push(SimulatedPayment {
                contrat_id: terms.contract_id.clone(),
                montant: terms.price,
                anchor_date: due,
                statut: if due < *today {
                    PaymentStatus::Impaye
                } else {
                    PaymentStatus::EnAttente
                },
            });
        }

        step = match step.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }

    simulated
}
