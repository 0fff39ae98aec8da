use crate::core::error::ChatError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Chat models offered in the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "o4-mini")]
    O4Mini,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Gpt4oMini, Model::Gpt41Mini, Model::O4Mini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::O4Mini => "o4-mini",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Model::ALL.iter().map(|m| m.as_str()).collect();
                ChatError::Input(format!(
                    "Unknown model '{}'. Available: {}",
                    s.trim(),
                    names.join(", ")
                ))
            })
    }
}

// f32 parsing noise, e.g. "1.2" may land a hair above 1.2
const RANGE_EPSILON: f32 = 1e-4;

/// Sampling temperature in [0.0, 1.2], stored in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Temperature(u8);

impl Temperature {
    pub const MIN: Temperature = Temperature(0);
    pub const MAX: Temperature = Temperature(12);

    /// Rejects values outside the slider range, then rounds to the nearest 0.1.
    pub fn new(value: f32) -> Result<Self, ChatError> {
        if !value.is_finite() {
            return Err(ChatError::Input(format!("Invalid temperature: {}", value)));
        }
        let range = (Self::MIN.value() - RANGE_EPSILON)..=(Self::MAX.value() + RANGE_EPSILON);
        if !range.contains(&value) {
            return Err(ChatError::Input(format!(
                "Temperature {} is outside the range {}..={}",
                value,
                Self::MIN,
                Self::MAX
            )));
        }
        let tenths = (value * 10.0).round().clamp(f32::from(Self::MIN.0), f32::from(Self::MAX.0));
        Ok(Temperature(tenths as u8))
    }

    pub fn value(&self) -> f32 {
        f32::from(self.0) / 10.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature(3)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

impl FromStr for Temperature {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f32 = s
            .trim()
            .parse()
            .map_err(|_| ChatError::Input(format!("Invalid temperature: {}", s.trim())))?;
        Temperature::new(value)
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.value())
    }
}

/// The three session controls: model selector, temperature slider and
/// knowledge-base toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: Model,
    pub temperature: Temperature,
    pub include_knowledge: bool,
}

impl Settings {
    /// Defaults with the knowledge toggle on only when a knowledge base exists.
    pub fn for_knowledge(knowledge: &str) -> Self {
        Self {
            model: Model::default(),
            temperature: Temperature::default(),
            include_knowledge: !knowledge.is_empty(),
        }
    }
}
