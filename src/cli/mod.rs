use std::env::current_dir;

use chrono::NaiveDate;
use clap::Parser;
use tracing::Level;

use crate::api::PaymentsApi;
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::contract::RecordId;
use crate::ledger::Ledger;
use crate::payment::EntryKey;
use crate::schedule::project;
use crate::settlement::settle;
use crate::vault::VaultImpl;
use argument_parsing::{Command, LedgerOptions};

mod argument_parsing;
mod formatting;

pub fn ledger_operation() {
    let arguments = LedgerOptions::parse();
    init_logging(arguments.verbose);

    let result: Result<String, String> = (|| {
        let vault_path = match &arguments.vault {
            Some(a) => a.clone(),
            None => current_dir().map_err(|e| e.to_string())?,
        };
        let mut vault = VaultImpl { path: vault_path };

        let clock: Box<dyn Clock> = match arguments.today {
            Some(today) => Box::new(FixedClock(today)),
            None => Box::new(SystemClock),
        };

        run(arguments.command.clone(), &mut vault, clock.as_ref())
    })();

    match result {
        Ok(screen) => print!("{}", screen),
        Err(error) => {
            eprintln!("Could not compute the payment ledger: {}", error);
            std::process::exit(1)
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run<A: PaymentsApi>(command: Command, api: &mut A, clock: &dyn Clock) -> Result<String, String> {
    let today = clock.today();

    match command {
        Command::Contracts => {
            let contracts = api.contracts().map_err(|e| e.to_string())?;
            Ok(formatting::format_contracts(&contracts, &today))
        }
        Command::Ledger { contract } => {
            let ledger = fetch_ledger(api, &contract, &today)?;
            Ok(formatting::format_ledger_screen(&contract, &ledger, &today))
        }
        Command::Reminders { contract } => {
            let ledger = fetch_ledger(api, &contract, &today)?;
            Ok(formatting::format_reminders(&contract, &ledger.reminders(&today), &today))
        }
        Command::Payments { pending_this_month } => {
            let mut payments = api.payments().map_err(|e| e.to_string())?;
            if pending_this_month {
                payments.retain(|payment| payment.is_pending_in_month_of(&today));
            }
            Ok(formatting::format_payments(&payments, pending_this_month, &today))
        }
        Command::Pay { contract, paid_on, due_dates } => {
            let paid_on = paid_on.unwrap_or(today);
            let ledger = fetch_ledger(api, &contract, &today)?;

            let selection = select_due_on(&ledger, &due_dates)?;
            let requests = ledger
                .payment_requests(&selection, &paid_on)
                .map_err(|e| e.to_string())?;
            let settlement = settle(api, requests);

            // The store is the reference once payments went through, simulated rows included
            let refreshed = fetch_ledger(api, &contract, &today)?;
            let screen = format!(
                "{}\n\n{}",
                formatting::format_settlement(&settlement),
                formatting::format_ledger_screen(&contract, &refreshed, &today)
            );

            if settlement.is_complete() {
                Ok(screen)
            } else {
                Err(screen)
            }
        }
    }
}

fn fetch_ledger<A: PaymentsApi>(api: &A, contract_id: &RecordId, today: &NaiveDate) -> Result<Ledger, String> {
    let contract = api.contract(contract_id).map_err(|e| e.to_string())?;
    let payments = api.payments_for(contract_id).map_err(|e| e.to_string())?;
    Ok(project(&contract, &payments, today))
}

// Several real payments can share a due date: only the payable ones are picked
fn select_due_on(ledger: &Ledger, due_dates: &[NaiveDate]) -> Result<Vec<EntryKey>, String> {
    let mut selection = Vec::new();
    for due_date in due_dates {
        let payable: Vec<EntryKey> = ledger
            .keys_due_on(due_date)
            .into_iter()
            .filter(|key| ledger.find(key).map(|entry| entry.can_pay()).unwrap_or(false))
            .collect();
        if payable.is_empty() {
            return Err(format!("No payable ledger row due on {}", due_date));
        }
        selection.extend(payable);
    }
    Ok(selection)
}
