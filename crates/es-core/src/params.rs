//! The five physical spin parameters and their domains.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum dimensionless spin magnitude.
pub const A_MAX: f64 = 1.0;

/// One of the five scalars describing a binary's spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinParameter {
    /// Primary spin magnitude.
    A1,
    /// Secondary spin magnitude.
    A2,
    /// Mass ratio, secondary over primary.
    Q,
    /// Cosine of the primary tilt.
    Cos1,
    /// Cosine of the secondary tilt.
    Cos2,
}

impl SpinParameter {
    /// Every parameter, in sample-table column order.
    pub const ALL: [SpinParameter; 5] = [
        SpinParameter::A1,
        SpinParameter::A2,
        SpinParameter::Q,
        SpinParameter::Cos1,
        SpinParameter::Cos2,
    ];

    /// Parameters whose density can be conditioned on xeff. `cos1` is absent
    /// because it is marginalised analytically by the uniform xeff window.
    pub const CONDITIONED: [SpinParameter; 4] = [
        SpinParameter::A1,
        SpinParameter::A2,
        SpinParameter::Q,
        SpinParameter::Cos2,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SpinParameter::A1 => "a1",
            SpinParameter::A2 => "a2",
            SpinParameter::Q => "q",
            SpinParameter::Cos1 => "cos1",
            SpinParameter::Cos2 => "cos2",
        }
    }

    /// Physical domain `(low, high)`.
    pub fn domain(self) -> (f64, f64) {
        match self {
            SpinParameter::A1 | SpinParameter::A2 | SpinParameter::Q => (0.0, 1.0),
            SpinParameter::Cos1 | SpinParameter::Cos2 => (-1.0, 1.0),
        }
    }

    /// Column position in a [`SampleTable`](crate::prior::SampleTable).
    pub fn index(self) -> usize {
        match self {
            SpinParameter::A1 => 0,
            SpinParameter::A2 => 1,
            SpinParameter::Q => 2,
            SpinParameter::Cos1 => 3,
            SpinParameter::Cos2 => 4,
        }
    }

    /// Error unless this parameter may be conditioned on xeff.
    pub fn ensure_conditionable(self) -> Result<Self> {
        if Self::CONDITIONED.contains(&self) {
            Ok(self)
        } else {
            Err(Error::UnsupportedConditioning(self.key().to_string()))
        }
    }
}

impl std::fmt::Display for SpinParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for SpinParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "a1" => Ok(SpinParameter::A1),
            "a2" => Ok(SpinParameter::A2),
            "q" => Ok(SpinParameter::Q),
            "cos1" => Ok(SpinParameter::Cos1),
            "cos2" => Ok(SpinParameter::Cos2),
            other => Err(Error::UnknownParameter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for p in SpinParameter::ALL {
            assert_eq!(p.key().parse::<SpinParameter>().unwrap(), p);
            assert_eq!(SpinParameter::ALL[p.index()], p);
        }
        assert!("theta1".parse::<SpinParameter>().is_err());
    }

    #[test]
    fn test_cos1_is_not_conditionable() {
        let err = SpinParameter::Cos1.ensure_conditionable().unwrap_err();
        assert_eq!(err.code(), 13);
        assert!(SpinParameter::Cos2.ensure_conditionable().is_ok());
    }

    #[test]
    fn test_domains() {
        assert_eq!(SpinParameter::Q.domain(), (0.0, 1.0));
        assert_eq!(SpinParameter::Cos2.domain(), (-1.0, 1.0));
    }
}
