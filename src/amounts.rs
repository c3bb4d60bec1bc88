use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

pub type Figure = Decimal;

pub const CURRENCY_SIGN: &str = "CFA";

/// Reads a figure sent either as a JSON number or as a decimal string.
pub fn parse_figure(value: &Value) -> Option<Figure> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(raw) => raw.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str_exact(&raw)
        .or_else(|_| Decimal::from_str(&raw))
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// Deserializes an optional figure, turning anything unreadable into `None`.
pub fn lenient_figure<'de, D>(deserializer: D) -> Result<Option<Figure>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_figure))
}

/// JSON number for a figure, as the backend stores amounts
pub fn figure_value(figure: &Figure) -> Value {
    let raw = figure.normalize().to_string();
    Number::from_str(&raw)
        .map(Value::Number)
        .unwrap_or(Value::String(raw))
}

// Rent amounts are shown the way the owners quote them
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayAmount(pub Figure);

impl Display for DisplayAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .normalize();
        write!(f, "{} {}", rounded, CURRENCY_SIGN)
    }
}
