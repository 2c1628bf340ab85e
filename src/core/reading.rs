//! # Reading
//!
//! One air-quality measurement: five environmental values.
//!
//! Field units as reported by the devices:
//! - `pm2_5`, `pm10`: particulate matter
//! - `co2`: ppm
//! - `temperature`: °C
//! - `humidity`: relative humidity in %

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, ValidationResult};

/// Air quality values reported by a device
///
/// Unknown keys are ignored when decoding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co2: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading {
    /// Create a reading, rejecting NaN and infinite values
    pub fn new(
        pm2_5: f64,
        pm10: f64,
        co2: f64,
        temperature: f64,
        humidity: f64,
    ) -> ValidationResult<Self> {
        let reading = Self {
            pm2_5,
            pm10,
            co2,
            temperature,
            humidity,
        };
        reading.validate()?;
        Ok(reading)
    }

    /// All-zero reading, used as the fabricated baseline
    pub const fn zero() -> Self {
        Self {
            pm2_5: 0.0,
            pm10: 0.0,
            co2: 0.0,
            temperature: 0.0,
            humidity: 0.0,
        }
    }

    /// Recommended indoor guiding values
    ///
    /// Shown next to charts as reference lines.
    pub const fn guiding() -> Self {
        Self {
            pm2_5: 25.0,
            pm10: 40.0,
            co2: 750.0,
            temperature: 20.0,
            humidity: 50.0,
        }
    }

    /// Named fields in declaration order
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("pm2_5", self.pm2_5),
            ("pm10", self.pm10),
            ("co2", self.co2),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
        ]
    }

    /// Check that every field is finite
    pub fn validate(&self) -> ValidationResult<()> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteReading { field, value });
            }
        }
        Ok(())
    }
}
