use chrono::NaiveDate;
use comfy_table::Table;

use crate::amounts::DisplayAmount;
use crate::contract::{Contract, RecordId};
use crate::ledger::{Ledger, Reminders};
use crate::payment::{LedgerEntry, RealPayment};
use crate::settlement::Settlement;

const MISSING: &str = "Non défini";

pub fn format_contracts(contracts: &[Contract], today: &NaiveDate) -> String {
    let mut components = vec![title("Contrats")];

    if contracts.is_empty() {
        components.push("No contract in this vault".to_string());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Contrat", "Du", "Au", "Périodicité", "Loyer"]);
        for contract in contracts {
            let terms = contract.terms(today);
            table.add_row(vec![
                contract.id.as_ref().map(|id| id.to_string()).unwrap_or(MISSING.to_string()),
                terms.start.to_string(),
                terms.end.to_string(),
                terms.periodicity.label().to_string(),
                DisplayAmount(terms.price).to_string(),
            ]);
        }
        components.push(table.to_string());
    }

    components.push(release());
    components.join("\n\n")
}

pub fn format_ledger_screen(contract_id: &RecordId, ledger: &Ledger, today: &NaiveDate) -> String {
    let mut components = vec![title(&format!("Paiements du contrat {} au {}", contract_id, today))];
    components.push(ledger_table(ledger, today));
    components.push(title(&format!(
        "Reste à payer: {}",
        DisplayAmount(ledger.outstanding())
    )));
    components.push(release());
    components.join("\n\n")
}

fn ledger_table(ledger: &Ledger, today: &NaiveDate) -> String {
    if ledger.entries().is_empty() {
        return "No payment for this contract".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Échéance", "Montant", "Statut", "Payé le", "Payable"]);
    for entry in ledger.entries() {
        table.add_row(vec![
            entry.due_date().to_string(),
            entry
                .amount()
                .map(|amount| DisplayAmount(amount).to_string())
                .unwrap_or(MISSING.to_string()),
            entry.status_label(today),
            entry
                .paid_on()
                .map(|date| date.to_string())
                .unwrap_or("Non payé".to_string()),
            (if entry.can_pay() { "✅" } else { "" }).to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_payments(payments: &[RealPayment], pending_this_month: bool, today: &NaiveDate) -> String {
    let heading = if pending_this_month {
        format!("Paiements en attente pour {}", today.format("%Y-%m"))
    } else {
        "Tous les paiements".to_string()
    };
    let mut components = vec![title(&heading)];

    if payments.is_empty() {
        components.push("Aucun paiement à afficher.".to_string());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Contrat", "Paiement", "Échéance", "Montant", "Statut", "Payé le"]);
        for payment in payments {
            table.add_row(vec![
                payment
                    .contrat_id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or(MISSING.to_string()),
                payment.id.to_string(),
                payment.date_echeance.to_string(),
                payment
                    .montant
                    .map(|amount| DisplayAmount(amount).to_string())
                    .unwrap_or(MISSING.to_string()),
                payment.statut.label().to_string(),
                payment
                    .date_paiement
                    .map(|date| date.to_string())
                    .unwrap_or("Non payé".to_string()),
            ]);
        }
        components.push(table.to_string());
    }

    components.push(release());
    components.join("\n\n")
}

fn reminder_line(entry: &LedgerEntry, situation: &str) -> String {
    let amount = DisplayAmount(entry.amount().unwrap_or_default());
    format!("Le paiement de {} du {} {}.", amount, entry.due_date(), situation)
}

pub fn format_reminders(contract_id: &RecordId, reminders: &Reminders, today: &NaiveDate) -> String {
    let mut components = vec![title(&format!("Rappels du contrat {} au {}", contract_id, today))];

    if reminders.is_empty() {
        components.push("Aucun paiement en retard ni à venir".to_string());
    }
    if !reminders.overdue.is_empty() {
        let mut lines = vec![title(&format!(
            "Attention : {} paiement(s) en retard !",
            reminders.overdue.len()
        ))];
        lines.extend(reminders.overdue.iter().map(|entry| reminder_line(entry, "est en retard")));
        components.push(lines.join("\n"));
    }
    if !reminders.upcoming.is_empty() {
        let mut lines = vec![title(&format!(
            "Rappel : {} paiement(s) à venir",
            reminders.upcoming.len()
        ))];
        lines.extend(reminders.upcoming.iter().map(|entry| reminder_line(entry, "est à venir")));
        components.push(lines.join("\n"));
    }

    components.join("\n\n")
}

pub fn format_settlement(settlement: &Settlement) -> String {
    let mut lines: Vec<String> = settlement
        .applied
        .iter()
        .map(|payment| {
            format!(
                "Paiement {} du {} enregistré",
                payment.id, payment.date_echeance
            )
        })
        .collect();

    if let Some((_, error)) = &settlement.failure {
        lines.push(format!("Could not record payment: {}", error));
        if !settlement.not_sent.is_empty() {
            lines.push(format!(
                "{} payment(s) were not sent",
                settlement.not_sent.len()
            ));
        }
    }

    lines.join("\n")
}

fn release() -> String {
    format!("Release: {}", env!("RELEASE"))
}

fn title(string: &str) -> String {
    let string_length = string.chars().count();
    string.to_string() + "\n" + &"=".repeat(string_length)
}
