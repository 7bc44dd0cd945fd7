use crate::protocol::ProfileUpdate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

pub const AGE_RANGE: RangeInclusive<u32> = 12..=100;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=300.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<u32> = 120..=250;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Idade deve estar entre 12 e 100 anos")]
    Age(u32),
    #[error("Peso deve estar entre 30 e 300 kg")]
    Weight(f64),
    #[error("Altura deve estar entre 120 e 250 cm")]
    Height(u32),
}

/// Biometric fields shared by registration and profile edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biometrics {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
}

impl Biometrics {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_age(self.age)?;
        validate_weight(self.weight_kg)?;
        validate_height(self.height_cm)?;
        Ok(())
    }

    pub fn bmi(&self) -> Bmi {
        calculate_bmi(self.weight_kg, self.height_cm)
    }
}

pub fn validate_age(age: u32) -> Result<(), ValidationError> {
    if AGE_RANGE.contains(&age) {
        Ok(())
    } else {
        Err(ValidationError::Age(age))
    }
}

pub fn validate_weight(weight_kg: f64) -> Result<(), ValidationError> {
    if WEIGHT_RANGE_KG.contains(&weight_kg) {
        Ok(())
    } else {
        Err(ValidationError::Weight(weight_kg))
    }
}

pub fn validate_height(height_cm: u32) -> Result<(), ValidationError> {
    if HEIGHT_RANGE_CM.contains(&height_cm) {
        Ok(())
    } else {
        Err(ValidationError::Height(height_cm))
    }
}

impl ProfileUpdate {
    /// Checks only the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        if let Some(weight) = self.weight {
            validate_weight(weight)?;
        }
        if let Some(height) = self.height {
            validate_height(height)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiCategory {
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else if bmi < 35.0 {
            BmiCategory::ObesityI
        } else if bmi < 40.0 {
            BmiCategory::ObesityII
        } else {
            BmiCategory::ObesityIII
        }
    }

    /// Label as shown to users (and as sent by the profile service).
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Abaixo do peso",
            BmiCategory::Normal => "Peso normal",
            BmiCategory::Overweight => "Sobrepeso",
            BmiCategory::ObesityI => "Obesidade grau I",
            BmiCategory::ObesityII => "Obesidade grau II",
            BmiCategory::ObesityIII => "Obesidade grau III",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

/// BMI rounded to one decimal; the category is derived from the rounded value.
pub fn calculate_bmi(weight_kg: f64, height_cm: u32) -> Bmi {
    let height_m = f64::from(height_cm) / 100.0;
    let raw = if height_m > 0.0 {
        weight_kg / (height_m * height_m)
    } else {
        0.0
    };
    let value = (raw * 10.0).round() / 10.0;
    Bmi {
        value,
        category: BmiCategory::from_value(value),
    }
}
