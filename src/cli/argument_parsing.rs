use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::contract::RecordId;
use crate::dates::parse_day;

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).ok_or(format!(
        "Could not decode date {}: Format is {{YEAR}}-{{MONTH}}-{{DAY}}, eg. 2024-06-15",
        &s
    ))
}

fn parse_record_id(s: &str) -> Result<RecordId, String> {
    if s.trim().is_empty() {
        return Err("An identifier cannot be empty".to_string());
    }
    Ok(RecordId::parse(s))
}

#[derive(Parser)]
#[command(about = "Rent payment ledger of lease contracts")]
pub struct LedgerOptions {
    #[arg(short = 'V', long)]
    pub vault: Option<PathBuf>,

    /// Compute the ledger as if today were this date
    #[arg(long = "today", value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the contracts of the vault
    Contracts,

    /// Show recorded and expected payments of a contract
    Ledger {
        #[arg(short = 'c', long = "contract", value_parser = parse_record_id)]
        contract: RecordId,
    },

    /// Show late payments and those due within a week
    Reminders {
        #[arg(short = 'c', long = "contract", value_parser = parse_record_id)]
        contract: RecordId,
    },

    /// List the payments recorded for every contract
    Payments {
        /// Only payments still awaited and due in the current month
        #[arg(long = "pending-this-month")]
        pending_this_month: bool,
    },

    /// Pay the ledger rows due on the given dates
    Pay {
        #[arg(short = 'c', long = "contract", value_parser = parse_record_id)]
        contract: RecordId,

        /// Payment date, today when omitted
        #[arg(long = "on", value_parser = parse_date)]
        paid_on: Option<NaiveDate>,

        #[arg(required = true, value_parser = parse_date)]
        due_dates: Vec<NaiveDate>,
    },
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::{Command, LedgerOptions};
    use crate::contract::RecordId;
    use chrono::NaiveDate;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn parse__pay_command() {
        let options = LedgerOptions::try_parse_from([
            "loyer", "-V", "/tmp/vault", "--today", "2024-06-15", "-vv",
            "pay", "-c", "7", "--on", "2024-06-14", "2024-06-08", "2024-06-15",
        ])
        .unwrap();

        assert_eq!(options.vault, Some(PathBuf::from("/tmp/vault")));
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2024, 6, 15));
        assert_eq!(options.verbose, 2);
        assert_eq!(
            options.command,
            Command::Pay {
                contract: RecordId::Number(7),
                paid_on: NaiveDate::from_ymd_opt(2024, 6, 14),
                due_dates: vec![
                    NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                ],
            }
        );
    }

    #[test]
    fn parse__text_contract_id() {
        let options = LedgerOptions::try_parse_from(["loyer", "ledger", "--contract", "bail-12"]).unwrap();
        assert_eq!(options.command, Command::Ledger { contract: RecordId::Text("bail-12".into()) });
    }

    #[test]
    fn parse__payments_overview() {
        let options = LedgerOptions::try_parse_from(["loyer", "payments"]).unwrap();
        assert_eq!(options.command, Command::Payments { pending_this_month: false });

        let options = LedgerOptions::try_parse_from(["loyer", "payments", "--pending-this-month"]).unwrap();
        assert_eq!(options.command, Command::Payments { pending_this_month: true });
    }

    #[test]
    fn parse__pay_without_rows_is_refused() {
        assert!(LedgerOptions::try_parse_from(["loyer", "pay", "-c", "7"]).is_err());
    }

    #[test]
    fn parse__bad_date_is_refused() {
        assert!(LedgerOptions::try_parse_from(["loyer", "--today", "15/06/2024", "contracts"]).is_err());
    }
}
