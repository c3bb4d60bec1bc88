use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, json, to_writer_pretty, Value};
use tracing::{debug, info, warn};

use crate::amounts::figure_value;
use crate::api::{NewPayment, PaymentsApi};
use crate::contract::{Contract, RecordId};
use crate::dates::day_key;
use crate::error::{LedgerError, Result};
use crate::payment::{PaymentStatus, RealPayment};

/// Directory holding the JSON records of the rental application
pub trait Vault {
    fn path(&self) -> &Path;
}

pub struct VaultImpl {
    pub path: PathBuf,
}

impl Vault for VaultImpl {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// A value stored as `<KEY>.json` at the root of the vault
pub trait VaultReadable: Sized + DeserializeOwned + Serialize {
    const KEY: &'static str;

    fn file<V: Vault>(vault: &V) -> PathBuf {
        vault.path().join(format!("{}.json", Self::KEY))
    }

    fn from_vault<V: Vault>(vault: &V) -> Result<Self> {
        let path = Self::file(vault);
        let file = File::open(&path).map_err(|source| LedgerError::Io { path: path.clone(), source })?;
        let value = from_reader(BufReader::new(file)).map_err(|source| LedgerError::Json { path: path.clone(), source })?;
        debug!(path = %path.display(), "Read vault file");
        Ok(value)
    }

    fn write_to_vault<V: Vault>(&self, vault: &V) -> Result<()> {
        let path = Self::file(vault);
        let file = File::create(&path).map_err(|source| LedgerError::Io { path: path.clone(), source })?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, self).map_err(|source| LedgerError::Json { path: path.clone(), source })?;
        writer.flush().map_err(|source| LedgerError::Io { path: path.clone(), source })?;
        debug!(path = %path.display(), "Wrote vault file");
        Ok(())
    }
}

pub type ContractsVaultValues = Vec<Contract>;
impl VaultReadable for ContractsVaultValues {
    const KEY: &'static str = "contracts";
}

/// Payment records exactly as stored. They stay raw so that a write never
/// re-encodes the records it does not touch.
pub type PaymentsVaultValues = Vec<Value>;
impl VaultReadable for PaymentsVaultValues {
    const KEY: &'static str = "payments";
}

fn record_id(record: &Value) -> Option<RecordId> {
    record.get("id").and_then(|id| RecordId::deserialize(id).ok())
}

fn read_payment(record: &Value) -> std::result::Result<RealPayment, serde_json::Error> {
    RealPayment::deserialize(record)
}

impl VaultImpl {
    // No payment file simply means nothing was recorded yet
    fn payment_records(&self) -> Result<PaymentsVaultValues> {
        match PaymentsVaultValues::from_vault(self) {
            Err(LedgerError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(vec![]),
            other => other,
        }
    }

    fn next_payment_id(records: &PaymentsVaultValues) -> RecordId {
        let highest = records
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0);
        RecordId::Number(highest + 1)
    }

    fn invalid_record(&self, source: serde_json::Error) -> LedgerError {
        LedgerError::Json { path: PaymentsVaultValues::file(self), source }
    }
}

impl PaymentsApi for VaultImpl {
    fn contracts(&self) -> Result<Vec<Contract>> {
        ContractsVaultValues::from_vault(self)
    }

    fn contract(&self, id: &RecordId) -> Result<Contract> {
        self.contracts()?
            .into_iter()
            .find(|contract| contract.id.as_ref() == Some(id))
            .ok_or_else(|| LedgerError::ContractNotFound(id.clone()))
    }

    // A record that cannot be placed on a ledger is left out, the others stay usable
    fn payments(&self) -> Result<Vec<RealPayment>> {
        Ok(self
            .payment_records()?
            .iter()
            .filter_map(|record| match read_payment(record) {
                Ok(payment) => Some(payment),
                Err(error) => {
                    warn!(%record, %error, "Skipped unreadable payment record");
                    None
                }
            })
            .collect())
    }

    fn payments_for(&self, contract_id: &RecordId) -> Result<Vec<RealPayment>> {
        Ok(self
            .payments()?
            .into_iter()
            .filter(|payment| payment.contrat_id.as_ref() == Some(contract_id))
            .collect())
    }

    fn create_payment(&mut self, payment: NewPayment) -> Result<RealPayment> {
        let mut records = self.payment_records()?;
        let record = json!({
            "id": VaultImpl::next_payment_id(&records),
            "contrat_id": payment.contrat_id,
            "montant": figure_value(&payment.montant),
            "date_echeance": day_key(&payment.date_echeance),
            "date_paiement": day_key(&payment.date_paiement),
            "statut": payment.statut.code(),
        });
        let created = read_payment(&record).map_err(|source| self.invalid_record(source))?;
        records.push(record);
        records.write_to_vault(self)?;

        info!(payment = %created.id, due = %created.date_echeance, "Created payment");
        Ok(created)
    }

    fn mark_paid(&mut self, payment_id: &RecordId, paid_on: NaiveDate) -> Result<RealPayment> {
        let mut records = self.payment_records()?;
        let record = records
            .iter_mut()
            .find(|record| record_id(record).as_ref() == Some(payment_id))
            .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.clone()))?;

        let payment = read_payment(record).map_err(|source| self.invalid_record(source))?;
        if payment.statut == PaymentStatus::Annule {
            return Err(LedgerError::Rejected(format!("payment {} was cancelled", payment_id)));
        }
        let fields = record
            .as_object_mut()
            .ok_or_else(|| LedgerError::Rejected(format!("payment {} is not a record", payment_id)))?;
        fields.insert("date_paiement".to_string(), Value::String(day_key(&paid_on)));
        fields.insert("statut".to_string(), Value::String(PaymentStatus::Paye.code().to_string()));
        let updated = read_payment(record).map_err(|source| self.invalid_record(source))?;
        records.write_to_vault(self)?;

        info!(payment = %updated.id, paid_on = %paid_on, "Marked payment as paid");
        Ok(updated)
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::{PaymentsVaultValues, VaultImpl, VaultReadable};
    use crate::api::{NewPayment, PaymentsApi};
    use crate::contract::RecordId;
    use crate::error::LedgerError;
    use crate::payment::PaymentStatus;
    use crate::periodicity::Periodicity;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::fs::{read_to_string, write};
    use tempfile::{tempdir, TempDir};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn vault_with(contracts: Value, payments: Option<Value>) -> (TempDir, VaultImpl) {
        let dir = tempdir().unwrap();
        write(dir.path().join("contracts.json"), contracts.to_string()).unwrap();
        if let Some(payments) = payments {
            write(dir.path().join("payments.json"), payments.to_string()).unwrap();
        }
        let vault = VaultImpl { path: dir.path().to_path_buf() };
        (dir, vault)
    }

    fn contracts() -> Value {
        json!([
            {"id": 7, "date_debut": "2024-06-01", "date_fin": "2024-06-29",
             "periodicite": "hebdomadaire", "chambre": {"prix": 30000}},
            {"id": "c-8"}
        ])
    }

    fn payments() -> Value {
        json!([
            {"id": 1, "contrat_id": 7, "montant": 30000, "date_echeance": "2024-06-01",
             "date_paiement": "2024-06-02", "statut": "paye", "mode": "especes"},
            {"id": 2, "contrat_id": 7, "montant": 30000, "date_echeance": "2024-06-08",
             "date_paiement": null, "statut": "impaye"},
            {"id": 3, "contrat_id": 9, "montant": 10000, "date_echeance": "2024-06-08",
             "statut": "annule"}
        ])
    }

    #[test]
    fn contract__found_by_id() {
        let (_dir, vault) = vault_with(contracts(), None);

        let contract = vault.contract(&RecordId::Number(7)).unwrap();
        assert_eq!(contract.periodicite, Periodicity::Hebdomadaire);
        assert!(vault.contract(&RecordId::Text("c-8".into())).is_ok());
    }

    #[test]
    fn contract__unknown_id() {
        let (_dir, vault) = vault_with(contracts(), None);

        match vault.contract(&RecordId::Number(70)) {
            Err(LedgerError::ContractNotFound(id)) => assert_eq!(id, RecordId::Number(70)),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn contracts__missing_file() {
        let dir = tempdir().unwrap();
        let vault = VaultImpl { path: dir.path().to_path_buf() };

        assert!(matches!(vault.contracts(), Err(LedgerError::Io { .. })));
    }

    #[test]
    fn contracts__malformed_file() {
        let dir = tempdir().unwrap();
        write(dir.path().join("contracts.json"), "{not json").unwrap();
        let vault = VaultImpl { path: dir.path().to_path_buf() };

        assert!(matches!(vault.contracts(), Err(LedgerError::Json { .. })));
    }

    #[test]
    fn payments_for__filters_by_contract() {
        let (_dir, vault) = vault_with(contracts(), Some(payments()));

        let ids: Vec<RecordId> = vault
            .payments_for(&RecordId::Number(7))
            .unwrap()
            .into_iter()
            .map(|payment| payment.id)
            .collect();
        assert_eq!(ids, vec![RecordId::Number(1), RecordId::Number(2)]);
    }

    #[test]
    fn payments_for__no_payment_file() {
        let (_dir, vault) = vault_with(contracts(), None);
        assert_eq!(vault.payments_for(&RecordId::Number(7)).unwrap(), vec![]);
    }

    #[test]
    fn create_payment__appends_with_next_id() {
        let (_dir, mut vault) = vault_with(contracts(), Some(payments()));

        let created = vault
            .create_payment(NewPayment {
                contrat_id: Some(RecordId::Number(7)),
                montant: dec!(30000),
                date_echeance: date(6, 15),
                date_paiement: date(6, 14),
                statut: PaymentStatus::Paye,
            })
            .unwrap();

        assert_eq!(created.id, RecordId::Number(4));
        assert_eq!(created.date_paiement, Some(date(6, 14)));
        let stored = PaymentsVaultValues::from_vault(&vault).unwrap();
        assert_eq!(stored[..3].to_vec(), *payments().as_array().unwrap());
        assert_eq!(
            stored[3],
            json!({"id": 4, "contrat_id": 7, "montant": 30000, "date_echeance": "2024-06-15",
                   "date_paiement": "2024-06-14", "statut": "paye"})
        );
    }

    #[test]
    fn create_payment__first_payment() {
        let (_dir, mut vault) = vault_with(contracts(), None);

        let created = vault
            .create_payment(NewPayment {
                contrat_id: Some(RecordId::Number(7)),
                montant: dec!(30000),
                date_echeance: date(6, 1),
                date_paiement: date(6, 1),
                statut: PaymentStatus::Paye,
            })
            .unwrap();
        assert_eq!(created.id, RecordId::Number(1));
    }

    #[test]
    fn mark_paid__updates_and_keeps_other_fields() {
        let (dir, mut vault) = vault_with(contracts(), Some(payments()));

        let updated = vault.mark_paid(&RecordId::Number(2), date(6, 15)).unwrap();
        assert_eq!(updated.statut, PaymentStatus::Paye);
        assert_eq!(updated.date_paiement, Some(date(6, 15)));

        let raw: Value = serde_json::from_str(&read_to_string(dir.path().join("payments.json")).unwrap()).unwrap();
        assert_eq!(raw[0]["mode"], json!("especes"));
        assert_eq!(raw[1]["statut"], json!("paye"));
        assert_eq!(raw[1]["date_paiement"], json!("2024-06-15"));
    }

    #[test]
    fn mark_paid__unknown_payment() {
        let (_dir, mut vault) = vault_with(contracts(), Some(payments()));

        assert!(matches!(
            vault.mark_paid(&RecordId::Number(42), date(6, 15)),
            Err(LedgerError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn mark_paid__cancelled_payment() {
        let (_dir, mut vault) = vault_with(contracts(), Some(payments()));

        assert!(matches!(
            vault.mark_paid(&RecordId::Number(3), date(6, 15)),
            Err(LedgerError::Rejected(_))
        ));
    }

    fn backend_records() -> Value {
        json!([
            {"id": 1, "contrat_id": 7, "montant": 30000, "date_echeance": "2024-06-01T09:30:00",
             "date_paiement": "02/06/2024", "statut": "rembourse"},
            {"id": 2, "contrat_id": 7, "montant": "30000.50", "date_echeance": "2024-06-08",
             "date_paiement": null, "statut": "impaye", "reference": {"banque": "BOA"}},
            {"id": 3, "contrat_id": 9, "date_echeance": null},
            {"id": 4, "contrat_id": 7, "date_echeance": "plus tard", "statut": "impaye"}
        ])
    }

    #[test]
    fn mark_paid__untouched_records_are_kept_verbatim() {
        let (_dir, mut vault) = vault_with(contracts(), Some(backend_records()));

        vault.mark_paid(&RecordId::Number(2), date(6, 15)).unwrap();

        let before = backend_records();
        let stored = PaymentsVaultValues::from_vault(&vault).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0], before[0]);
        assert_eq!(stored[2], before[2]);
        assert_eq!(stored[3], before[3]);
        assert_eq!(
            stored[1],
            json!({"id": 2, "contrat_id": 7, "montant": "30000.50", "date_echeance": "2024-06-08",
                   "date_paiement": "2024-06-15", "statut": "paye", "reference": {"banque": "BOA"}})
        );
    }

    #[test]
    fn create_payment__untouched_records_are_kept_verbatim() {
        let (_dir, mut vault) = vault_with(contracts(), Some(backend_records()));

        let created = vault
            .create_payment(NewPayment {
                contrat_id: Some(RecordId::Number(7)),
                montant: dec!(30000),
                date_echeance: date(6, 15),
                date_paiement: date(6, 15),
                statut: PaymentStatus::Paye,
            })
            .unwrap();

        assert_eq!(created.id, RecordId::Number(5));
        let stored = PaymentsVaultValues::from_vault(&vault).unwrap();
        assert_eq!(stored[..4].to_vec(), *backend_records().as_array().unwrap());
    }

    #[test]
    fn payments_for__unreadable_due_dates_are_skipped() {
        let (_dir, vault) = vault_with(contracts(), Some(backend_records()));

        let payments = vault.payments_for(&RecordId::Number(7)).unwrap();
        let ids: Vec<RecordId> = payments.iter().map(|payment| payment.id.clone()).collect();
        assert_eq!(ids, vec![RecordId::Number(1), RecordId::Number(2)]);
        assert_eq!(payments[0].statut, PaymentStatus::Inconnu);
        assert_eq!(payments[0].date_echeance, date(6, 1));
        assert_eq!(payments[1].montant, Some(dec!(30000.50)));
    }

    #[test]
    fn payments__every_contract() {
        let (_dir, vault) = vault_with(contracts(), Some(payments()));

        let ids: Vec<RecordId> = vault.payments().unwrap().into_iter().map(|payment| payment.id).collect();
        assert_eq!(ids, vec![RecordId::Number(1), RecordId::Number(2), RecordId::Number(3)]);
    }

    #[test]
    fn mark_paid__unreadable_record() {
        let (_dir, mut vault) = vault_with(contracts(), Some(backend_records()));

        assert!(matches!(
            vault.mark_paid(&RecordId::Number(4), date(6, 15)),
            Err(LedgerError::Json { .. })
        ));
        let stored = PaymentsVaultValues::from_vault(&vault).unwrap();
        assert_eq!(stored[3], backend_records()[3]);
    }
}
