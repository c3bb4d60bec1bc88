use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

use crate::amounts::Figure;
use crate::contract::{Contract, RecordId};
use crate::error::Result;
use crate::payment::{PaymentStatus, RealPayment};

/// Body of a "create payment" call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPayment {
    pub contrat_id: Option<RecordId>,
    pub montant: Figure,
    pub date_echeance: NaiveDate,
    pub date_paiement: NaiveDate,
    pub statut: PaymentStatus,
}

/// The store holding contracts and the payments recorded against them
#[cfg_attr(test, automock)]
pub trait PaymentsApi {
    fn contracts(&self) -> Result<Vec<Contract>>;
    fn contract(&self, id: &RecordId) -> Result<Contract>;
    fn payments(&self) -> Result<Vec<RealPayment>>;
    fn payments_for(&self, contract_id: &RecordId) -> Result<Vec<RealPayment>>;
    fn create_payment(&mut self, payment: NewPayment) -> Result<RealPayment>;
    fn mark_paid(&mut self, payment_id: &RecordId, paid_on: NaiveDate) -> Result<RealPayment>;
}
