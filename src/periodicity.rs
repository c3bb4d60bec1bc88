use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Cadence of the rent obligations of a contract
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Journalier,
    Hebdomadaire,
    #[default]
    Mensuel,
    Trimestriel,
    Annuel,
}

impl Periodicity {
    /// Unrecognized cadences fall back to monthly
    pub fn from_label(label: &str) -> Periodicity {
        match label.trim() {
            "journalier" => Periodicity::Journalier,
            "hebdomadaire" => Periodicity::Hebdomadaire,
            "mensuel" => Periodicity::Mensuel,
            "trimestriel" => Periodicity::Trimestriel,
            "annuel" => Periodicity::Annuel,
            _ => Periodicity::default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Periodicity::Journalier => "Journalier",
            Periodicity::Hebdomadaire => "Hebdomadaire",
            Periodicity::Mensuel => "Mensuel",
            Periodicity::Trimestriel => "Trimestriel",
            Periodicity::Annuel => "Annuel",
        }
    }

    /// Due date of the `step`-th obligation counted from `anchor`.
    ///
    /// Month based cadences are computed from the anchor rather than from the
    /// previous slot: a lease starting on the 31st comes back to the 31st after
    /// a short month instead of sticking to the 29th. Returns `None` once the
    /// calendar overflows.
    pub fn slot(&self, anchor: &NaiveDate, step: u32) -> Option<NaiveDate> {
        match self {
            Periodicity::Journalier => anchor.checked_add_days(Days::new(step as u64)),
            Periodicity::Hebdomadaire => anchor.checked_add_days(Days::new(step as u64 * 7)),
            Periodicity::Mensuel => anchor.checked_add_months(Months::new(step)),
            Periodicity::Trimestriel => anchor.checked_add_months(Months::new(step.checked_mul(3)?)),
            Periodicity::Annuel => anchor.checked_add_months(Months::new(step.checked_mul(12)?)),
        }
    }
}

impl<'de> Deserialize<'de> for Periodicity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match label {
            Some(serde_json::Value::String(label)) => Periodicity::from_label(&label),
            _ => Periodicity::default(),
        })
    }
}
