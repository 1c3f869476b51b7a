use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A coarse daily market-direction label derived from thresholding a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Regime {
    Bull,
    Sideway,
    Bear,
}

impl Regime {
    /// All regimes in display order.
    pub const ALL: [Regime; 3] = [Regime::Bull, Regime::Sideway, Regime::Bear];

    /// The upper-case label shown as the "current regime".
    pub fn label(&self) -> &'static str {
        match self {
            Regime::Bull => "BULL",
            Regime::Sideway => "SIDEWAY",
            Regime::Bear => "BEAR",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Regime::Bull => "Bull",
            Regime::Sideway => "Sideway",
            Regime::Bear => "Bear",
        };
        f.write_str(name)
    }
}

/// Where a dataset came from. Fallback data must never be shown as real.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason")]
pub enum DataOrigin {
    #[default]
    Live,
    Fallback(String),
}

impl DataOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DataOrigin::Fallback(_))
    }

    /// Combines the origins of two datasets rendered together.
    pub fn merge(self, other: DataOrigin) -> DataOrigin {
        match (self, other) {
            (DataOrigin::Live, DataOrigin::Live) => DataOrigin::Live,
            (DataOrigin::Fallback(reason), DataOrigin::Live)
            | (DataOrigin::Live, DataOrigin::Fallback(reason)) => DataOrigin::Fallback(reason),
            (DataOrigin::Fallback(a), DataOrigin::Fallback(b)) => {
                DataOrigin::Fallback(format!("{a}; {b}"))
            }
        }
    }
}

/// A bank ticker, or the `ALL` sentinel denoting the industry aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolSelection {
    All,
    Symbol(String),
}

impl SymbolSelection {
    /// The value used in URL paths and on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            SymbolSelection::All => "ALL",
            SymbolSelection::Symbol(symbol) => symbol,
        }
    }

    pub fn matches(&self, symbol: &str) -> bool {
        match self {
            SymbolSelection::All => true,
            SymbolSelection::Symbol(own) => own.eq_ignore_ascii_case(symbol),
        }
    }
}

impl FromStr for SymbolSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "symbol must not be empty".to_string(),
            ));
        }
        if trimmed.eq_ignore_ascii_case("ALL") {
            return Ok(SymbolSelection::All);
        }
        Ok(SymbolSelection::Symbol(trimmed.to_uppercase()))
    }
}

impl fmt::Display for SymbolSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The advisor sends labels either as class indices or as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Number(f64),
    Text(String),
}

impl RawLabel {
    fn into_parts(self) -> Result<i64, String> {
        match self {
            RawLabel::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            RawLabel::Number(n) => Err(n.to_string()),
            RawLabel::Text(text) => Err(text),
        }
    }
}

/// The regime reported by the advisor's inference model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorRegime {
    Bear,
    Neutral,
    Bull,
    Other(String),
}

impl AdvisorRegime {
    /// Maps the model's class index (`0 = Bear, 1 = Neutral, 2 = Bull`).
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => AdvisorRegime::Bear,
            1 => AdvisorRegime::Neutral,
            2 => AdvisorRegime::Bull,
            other => AdvisorRegime::Other(other.to_string()),
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bear" => AdvisorRegime::Bear,
            "neutral" | "sideway" => AdvisorRegime::Neutral,
            "bull" => AdvisorRegime::Bull,
            _ => AdvisorRegime::Other(label.to_string()),
        }
    }
}

impl fmt::Display for AdvisorRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorRegime::Bear => f.write_str("Bear"),
            AdvisorRegime::Neutral => f.write_str("Neutral"),
            AdvisorRegime::Bull => f.write_str("Bull"),
            AdvisorRegime::Other(raw) => f.write_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for AdvisorRegime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLabel::deserialize(deserializer)?.into_parts() {
            Ok(index) => AdvisorRegime::from_index(index),
            Err(text) => AdvisorRegime::from_label(&text),
        })
    }
}

impl Serialize for AdvisorRegime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The predicted price direction reported by the advisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorDirection {
    Up,
    Down,
    Other(String),
}

impl fmt::Display for AdvisorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisorDirection::Up => f.write_str("Up"),
            AdvisorDirection::Down => f.write_str("Down"),
            AdvisorDirection::Other(raw) => f.write_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for AdvisorDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawLabel::deserialize(deserializer)?.into_parts() {
            Ok(1) => AdvisorDirection::Up,
            Ok(0) => AdvisorDirection::Down,
            Ok(other) => AdvisorDirection::Other(other.to_string()),
            Err(text) => match text.trim().to_ascii_lowercase().as_str() {
                "up" => AdvisorDirection::Up,
                "down" => AdvisorDirection::Down,
                _ => AdvisorDirection::Other(text),
            },
        })
    }
}

impl Serialize for AdvisorDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
