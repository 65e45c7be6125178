//! Shared utility functions for soilmap crates.

/// Lenient numeric coercion for tabular source data.
pub mod numbers {
    use serde::{Serialize, Serializer};
    use std::fmt;

    /// A finite number read from a text cell.
    ///
    /// Integral values serialize (and display) without a fractional part, so
    /// `"7"` and `"7.0"` both come out as `7`.
    #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
    pub struct Numeric(pub f64);

    impl Numeric {
        pub fn value(self) -> f64 {
            self.0
        }

        fn as_integer(self) -> Option<i64> {
            let v = self.0;
            if v.fract() == 0.0 && v.abs() < 9.007_199_254_740_992e15 {
                Some(v as i64)
            } else {
                None
            }
        }
    }

    impl fmt::Display for Numeric {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self.as_integer() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", self.0),
            }
        }
    }

    impl Serialize for Numeric {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self.as_integer() {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(self.0),
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Numeric {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            f64::deserialize(deserializer).map(Numeric)
        }
    }

    /// Parse a cell into a finite number.
    ///
    /// Empty cells, placeholders such as `N/A`, and anything that is not a
    /// finite decimal yield `None`. A decimal comma is accepted.
    pub fn parse_number(raw: &str) -> Option<Numeric> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed = match trimmed.parse::<f64>() {
            Ok(v) => v,
            Err(_) => trimmed.replace(',', ".").parse::<f64>().ok()?,
        };
        if parsed.is_finite() {
            Some(Numeric(parsed))
        } else {
            None
        }
    }

    /// Like [`parse_number`] but falls back to zero.
    pub fn parse_number_or_zero(raw: &str) -> Numeric {
        parse_number(raw).unwrap_or(Numeric(0.0))
    }

    /// Canonical text form of an identifier cell: the number when it parses
    /// (so `"01"` and `"1"` agree), the trimmed text otherwise.
    pub fn key_part(raw: &str) -> String {
        match parse_number(raw) {
            Some(n) => n.to_string(),
            None => raw.trim().to_string(),
        }
    }

}

/// Header normalization for tabular source data.
pub mod headers {
    /// Fold a header cell to its canonical form: byte-order mark and
    /// surrounding whitespace stripped, upper-cased.
    pub fn canonical_header(raw: &str) -> String {
        raw.trim_start_matches('\u{feff}').trim().to_uppercase()
    }

}
