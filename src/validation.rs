// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side checks that run before any request is issued.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static RUC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{11}$").unwrap());
static DNI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8}$").unwrap());

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("RUC must have exactly 11 digits (got '{0}')")]
    Ruc(String),
    #[error("DNI must have exactly 8 digits (got '{0}')")]
    Dni(String),
    #[error("missing required field: {0}")]
    Missing(&'static str),
    #[error("{field} must be between 0 and 100 (got {value})")]
    Percentage { field: &'static str, value: f64 },
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("unknown mineral '{0}' (expected oro, plata or cobre)")]
    Mineral(String),
}

/// A validated tax identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxId {
    Ruc(String),
    Dni(String),
}

impl TaxId {
    pub fn ruc(s: &str) -> Result<Self, ValidationError> {
        if RUC_RE.is_match(s) {
            Ok(TaxId::Ruc(s.to_string()))
        } else {
            Err(ValidationError::Ruc(s.to_string()))
        }
    }

    pub fn dni(s: &str) -> Result<Self, ValidationError> {
        if DNI_RE.is_match(s) {
            Ok(TaxId::Dni(s.to_string()))
        } else {
            Err(ValidationError::Dni(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaxId::Ruc(s) | TaxId::Dni(s) => s,
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            TaxId::Ruc(s) => format!("/sunat/search-ruc/{}", s),
            TaxId::Dni(s) => format!("/sunat/search-dni/{}", s),
        }
    }
}

pub fn percentage(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::Percentage { field, value })
    }
}

pub fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruc_needs_exactly_eleven_digits() {
        assert_eq!(
            TaxId::ruc("20123456789").unwrap(),
            TaxId::Ruc("20123456789".into())
        );
        for bad in ["2012345678", "201234567890", "2012345678a", "", "20123 456789", "٢٠١٢٣٤٥٦٧٨٩"] {
            assert!(TaxId::ruc(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn dni_needs_exactly_eight_digits() {
        assert!(TaxId::dni("12345678").is_ok());
        for bad in ["1234567", "123456789", "1234567x", "-1234567"] {
            assert!(TaxId::dni(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn endpoints_follow_id_kind() {
        assert_eq!(
            TaxId::ruc("20123456789").unwrap().endpoint(),
            "/sunat/search-ruc/20123456789"
        );
        assert_eq!(
            TaxId::dni("12345678").unwrap().endpoint(),
            "/sunat/search-dni/12345678"
        );
    }

    #[test]
    fn percentage_bounds() {
        assert!(percentage("law_percentage", 0.0).is_ok());
        assert!(percentage("law_percentage", 100.0).is_ok());
        assert!(percentage("law_percentage", 100.5).is_err());
        assert!(positive("quantity_kg", 0.0).is_err());
    }
}
