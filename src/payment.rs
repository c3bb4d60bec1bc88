use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
#[cfg(test)]
use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::amounts::{lenient_figure, Figure};
use crate::contract::RecordId;
use crate::dates::{lenient_day, strict_day};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paye,
    Impaye,
    EnAttente,
    Annule,
    Inconnu,
}

impl PaymentStatus {
    pub fn from_label(label: &str) -> PaymentStatus {
        match label.trim() {
            "paye" => PaymentStatus::Paye,
            "impaye" => PaymentStatus::Impaye,
            "en_attente" => PaymentStatus::EnAttente,
            "annule" => PaymentStatus::Annule,
            _ => PaymentStatus::Inconnu,
        }
    }

    /// Value stored by the backend
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Paye => "paye",
            PaymentStatus::Impaye => "impaye",
            PaymentStatus::EnAttente => "en_attente",
            PaymentStatus::Annule => "annule",
            PaymentStatus::Inconnu => "inconnu",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paye => "Payé",
            PaymentStatus::Impaye => "Impayé",
            PaymentStatus::EnAttente => "À Venir",
            PaymentStatus::Annule => "Annulé",
            PaymentStatus::Inconnu => "Inconnu",
        }
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<Value>::deserialize(deserializer)?;
        Ok(match label {
            Some(Value::String(label)) => PaymentStatus::from_label(&label),
            _ => PaymentStatus::Inconnu,
        })
    }
}

/// Payment persisted by the backend.
///
/// Fields the ledger does not use are kept in `extra` so that the record goes
/// back to the store exactly as it came.
#[cfg_attr(test, derive(Builder))]
#[cfg_attr(test, builder(pattern = "owned"))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealPayment {
    pub id: RecordId,
    #[cfg_attr(test, builder(default))]
    #[serde(default)]
    pub contrat_id: Option<RecordId>,
    #[cfg_attr(test, builder(default))]
    #[serde(default, deserialize_with = "lenient_figure")]
    pub montant: Option<Figure>,
    #[serde(deserialize_with = "strict_day")]
    pub date_echeance: NaiveDate,
    #[cfg_attr(test, builder(default))]
    #[serde(default, deserialize_with = "lenient_day")]
    pub date_paiement: Option<NaiveDate>,
    pub statut: PaymentStatus,
    #[cfg_attr(test, builder(default))]
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RealPayment {
    /// Still awaited and due in the calendar month of `today`
    pub fn is_pending_in_month_of(&self, today: &NaiveDate) -> bool {
        matches!(self.statut, PaymentStatus::Impaye | PaymentStatus::EnAttente)
            && self.date_echeance.year() == today.year()
            && self.date_echeance.month() == today.month()
    }
}

/// Obligation inferred from the contract terms, never persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulatedPayment {
    pub contrat_id: Option<RecordId>,
    pub montant: Figure,
    pub anchor_date: NaiveDate,
    pub statut: PaymentStatus,
}

/// Selection key of a ledger row
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKey {
    Real { id: RecordId },
    Simulated { anchor_date: NaiveDate },
}

impl Display for EntryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKey::Real { id } => write!(f, "payment {}", id),
            EntryKey::Simulated { anchor_date } => write!(f, "scheduled payment due {}", anchor_date),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntry {
    Real(RealPayment),
    Simulated(SimulatedPayment),
}

impl LedgerEntry {
    pub fn key(&self) -> EntryKey {
        match self {
            LedgerEntry::Real(payment) => EntryKey::Real { id: payment.id.clone() },
            LedgerEntry::Simulated(payment) => EntryKey::Simulated { anchor_date: payment.anchor_date },
        }
    }

    pub fn due_date(&self) -> &NaiveDate {
        match self {
            LedgerEntry::Real(payment) => &payment.date_echeance,
            LedgerEntry::Simulated(payment) => &payment.anchor_date,
        }
    }

    pub fn amount(&self) -> Option<Figure> {
        match self {
            LedgerEntry::Real(payment) => payment.montant,
            LedgerEntry::Simulated(payment) => Some(payment.montant),
        }
    }

    pub fn status(&self) -> PaymentStatus {
        match self {
            LedgerEntry::Real(payment) => payment.statut,
            LedgerEntry::Simulated(payment) => payment.statut,
        }
    }

    pub fn paid_on(&self) -> Option<&NaiveDate> {
        match self {
            LedgerEntry::Real(payment) => payment.date_paiement.as_ref(),
            LedgerEntry::Simulated(_) => None,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, LedgerEntry::Simulated(_))
    }

    /// An entry can be settled while it has no payment date and is either
    /// simulated or still open on the backend.
    pub fn can_pay(&self) -> bool {
        let open = match self {
            LedgerEntry::Simulated(_) => true,
            LedgerEntry::Real(payment) => {
                matches!(payment.statut, PaymentStatus::Impaye | PaymentStatus::EnAttente)
            }
        };
        open && self.paid_on().is_none()
    }

    pub fn is_overdue(&self, today: &NaiveDate) -> bool {
        let late = self.due_date() < today;
        match self {
            LedgerEntry::Simulated(_) => late,
            LedgerEntry::Real(payment) => late && payment.statut == PaymentStatus::Impaye,
        }
    }

    /// Status shown to the tenant: simulated rows read "Prévu", late rows are flagged
    pub fn status_label(&self, today: &NaiveDate) -> String {
        let label = if self.is_simulated() {
            "Prévu"
        } else {
            self.status().label()
        };

        if self.is_overdue(today) {
            format!("{} (En retard)", label)
        } else {
            label.to_string()
        }
    }
}
