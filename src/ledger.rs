use chrono::{Days, NaiveDate};
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

use crate::amounts::Figure;
use crate::api::NewPayment;
use crate::contract::RecordId;
use crate::payment::{EntryKey, LedgerEntry, PaymentStatus};

/// How far ahead an open obligation counts as upcoming
pub const UPCOMING_HORIZON_DAYS: u64 = 7;

/// Real and simulated payments of one contract, ordered by due date
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Reminders<'a> {
    pub overdue: Vec<&'a LedgerEntry>,
    pub upcoming: Vec<&'a LedgerEntry>,
}

impl<'a> Reminders<'a> {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.upcoming.is_empty()
    }
}

/// A call to make against the payments store to settle one ledger row
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentRequest {
    Create(NewPayment),
    MarkPaid { id: RecordId, date_paiement: NaiveDate },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No ledger row for {0}")]
    UnknownEntry(EntryKey),
    #[error("The row for {0} cannot be paid")]
    NotPayable(EntryKey),
}

impl Ledger {
    /// `entries` must already be ordered by due date
    pub(crate) fn new(entries: Vec<LedgerEntry>) -> Ledger {
        Ledger { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn find(&self, key: &EntryKey) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.key() == *key)
    }

    /// Keys of the rows due on `day`, real payments first
    pub fn keys_due_on(&self, day: &NaiveDate) -> Vec<EntryKey> {
        self.entries
            .iter()
            .filter(|entry| entry.due_date() == day)
            .map(|entry| entry.key())
            .collect()
    }

    /// Sum of the amounts still to be paid
    pub fn outstanding(&self) -> Figure {
        self.entries
            .iter()
            .filter(|entry| entry.can_pay())
            .fold(dec!(0), |total, entry| total + entry.amount().unwrap_or(dec!(0)))
    }

    pub fn reminders(&self, today: &NaiveDate) -> Reminders {
        let horizon = today
            .checked_add_days(Days::new(UPCOMING_HORIZON_DAYS))
            .unwrap_or(NaiveDate::MAX);

        let mut reminders = Reminders { overdue: vec![], upcoming: vec![] };
        for entry in self.entries.iter() {
            let due = entry.due_date();
            let open = entry.is_simulated() || entry.status() == PaymentStatus::EnAttente;

            if entry.is_overdue(today) {
                reminders.overdue.push(entry);
            } else if open && due >= today && *due <= horizon {
                reminders.upcoming.push(entry);
            }
        }
        reminders
    }

    /// Turns the selected rows into calls to the payments store.
    ///
    /// Simulated rows are created as paid, real rows are marked paid. The whole
    /// selection is rejected if a key is unknown or its row cannot be paid.
    pub fn payment_requests(
        &self,
        selection: &[EntryKey],
        paid_on: &NaiveDate,
    ) -> Result<Vec<PaymentRequest>, SelectionError> {
        let mut requests = Vec::new();
        for key in selection {
            let entry = self
                .find(key)
                .ok_or_else(|| SelectionError::UnknownEntry(key.clone()))?;
            if !entry.can_pay() {
                return Err(SelectionError::NotPayable(key.clone()));
            }

            let request = match entry {
                LedgerEntry::Simulated(simulated) => PaymentRequest::Create(NewPayment {
                    contrat_id: simulated.contrat_id.clone(),
                    montant: simulated.montant,
                    date_echeance: simulated.anchor_date,
                    date_paiement: *paid_on,
                    statut: PaymentStatus::Paye,
                }),
                LedgerEntry::Real(payment) => PaymentRequest::MarkPaid {
                    id: payment.id.clone(),
                    date_paiement: *paid_on,
                },
            };
            if !requests.contains(&request) {
                requests.push(request);
            }
        }
        Ok(requests)
    }
}
