use tracing::{info, warn};

use crate::api::PaymentsApi;
use crate::error::LedgerError;
use crate::ledger::PaymentRequest;
use crate::payment::RealPayment;

/// Outcome of a batch of payment requests.
///
/// Requests are independent calls: those applied before a failure stay applied,
/// and those after it are never sent.
#[derive(Debug)]
pub struct Settlement {
    pub applied: Vec<RealPayment>,
    pub failure: Option<(PaymentRequest, LedgerError)>,
    pub not_sent: Vec<PaymentRequest>,
}

impl Settlement {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

pub fn settle<A: PaymentsApi>(api: &mut A, requests: Vec<PaymentRequest>) -> Settlement {
    let mut settlement = Settlement {
        applied: vec![],
        failure: None,
        not_sent: vec![],
    };

    let mut requests = requests.into_iter();
    for request in requests.by_ref() {
        let result = match &request {
            PaymentRequest::Create(payment) => api.create_payment(payment.clone()),
            PaymentRequest::MarkPaid { id, date_paiement } => api.mark_paid(id, *date_paiement),
        };

        match result {
            Ok(payment) => {
                info!(payment = %payment.id, due = %payment.date_echeance, "Payment recorded");
                settlement.applied.push(payment);
            }
            Err(error) => {
                warn!(%error, "Payment request failed, the rest of the batch is not sent");
                settlement.failure = Some((request, error));
                break;
            }
        }
    }
    settlement.not_sent = requests.collect();

    settlement
}
