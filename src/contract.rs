use std::fmt::{Display, Formatter};

use chrono::{Months, NaiveDate};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amounts::{lenient_figure, Figure};
use crate::dates::lenient_day;
use crate::periodicity::Periodicity;

/// Identifier assigned by the backend. Numbers and strings are both opaque to us.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    /// Reads an identifier typed on the command line
    pub fn parse(raw: &str) -> RecordId {
        raw.trim()
            .parse::<u64>()
            .map(RecordId::Number)
            .unwrap_or_else(|_| RecordId::Text(raw.trim().to_string()))
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(number) => write!(f, "{}", number),
            RecordId::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chambre {
    #[serde(default, deserialize_with = "lenient_figure")]
    pub prix: Option<Figure>,
}

/// Lease contract as the backend serves it. Every field may be missing or malformed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Contract {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_day")]
    pub date_debut: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_day")]
    pub date_fin: Option<NaiveDate>,
    #[serde(default)]
    pub periodicite: Periodicity,
    #[serde(default)]
    pub chambre: Option<Chambre>,
}

/// Contract terms with every default resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaseTerms {
    pub contract_id: Option<RecordId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub periodicity: Periodicity,
    pub price: Figure,
}

impl Contract {
    pub fn terms(&self, today: &NaiveDate) -> LeaseTerms {
        let start = self.date_debut.unwrap_or(*today);
        let end = self
            .date_fin
            .or_else(|| start.checked_add_months(Months::new(12)))
            .unwrap_or(NaiveDate::MAX);

        LeaseTerms {
            contract_id: self.id.clone(),
            start,
            end,
            periodicity: self.periodicite,
            price: self
                .chambre
                .as_ref()
                .and_then(|chambre| chambre.prix)
                .filter(|price| !price.is_sign_negative())
                .unwrap_or(dec!(0)),
        }
    }
}
