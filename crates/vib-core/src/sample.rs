//! Tri-axial accelerometer samples and record decoding

use crate::error::{VibError, VibResult};
use crate::validation_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Accelerometer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in canonical order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Label used in records and reports
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single tri-axial reading. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Acquisition time as reported by the sensor
    #[serde(rename = "Time", alias = "time")]
    pub timestamp: f64,
    #[serde(rename = "X", alias = "x")]
    pub x: f64,
    #[serde(rename = "Y", alias = "y")]
    pub y: f64,
    #[serde(rename = "Z", alias = "z")]
    pub z: f64,
}

/// Record keys in decoding order, with accepted lower-case aliases
const RECORD_FIELDS: [(&str, &str); 4] = [("Time", "time"), ("X", "x"), ("Y", "y"), ("Z", "z")];

impl Sample {
    /// Create a sample, rejecting non-finite values
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> VibResult<Self> {
        for ((name, _), value) in RECORD_FIELDS.iter().zip([timestamp, x, y, z]) {
            if !value.is_finite() {
                return Err(validation_error!("field '{}' is not finite ({})", name, value));
            }
        }
        Ok(Self { timestamp, x, y, z })
    }

    /// Decode a raw JSON record such as `{"Time": 0.01, "X": 0.2, "Y": -0.1, "Z": 9.8}`
    ///
    /// Every field must be present and numeric; nothing is defaulted.
    pub fn from_record(record: &Value) -> VibResult<Self> {
        let object = record
            .as_object()
            .ok_or_else(|| validation_error!("expected a JSON object, got {}", json_kind(record)))?;

        let mut values = [0.0f64; 4];
        for (slot, (name, alias)) in values.iter_mut().zip(RECORD_FIELDS.iter()) {
            let field = object
                .get(*name)
                .or_else(|| object.get(*alias))
                .ok_or_else(|| validation_error!("missing required field '{}'", name))?;

            *slot = field.as_f64().ok_or_else(|| {
                validation_error!("field '{}' is not numeric ({})", name, json_kind(field))
            })?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Decode a raw JSON text record
    pub fn from_json_str(raw: &str) -> VibResult<Self> {
        let record: Value = serde_json::from_str(raw)
            .map_err(|e| validation_error!("record is not valid JSON: {}", e))?;
        Self::from_record(&record)
    }

    /// Encode in the wire record layout
    pub fn to_record(&self) -> Value {
        serde_json::json!({
            "Time": self.timestamp,
            "X": self.x,
            "Y": self.y,
            "Z": self.z,
        })
    }

    /// Value on one axis
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Euclidean magnitude of the acceleration vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl TryFrom<&Value> for Sample {
    type Error = VibError;

    fn try_from(record: &Value) -> VibResult<Self> {
        Sample::from_record(record)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
