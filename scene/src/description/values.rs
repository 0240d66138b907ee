//! Numeric value encodings used throughout scene descriptions.
//!
//! Vectors appear either as JSON arrays (`[1, 0.5, 0]`), as space-separated
//! strings (`"1 0.5 0"`) or, for uniform vectors, as a bare number.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f32),
    Text(String),
    List(Vec<f32>),
}

fn parse_floats<E: serde::de::Error>(repr: Repr) -> Result<Vec<f32>, E> {
    match repr {
        Repr::Number(v) => Ok(vec![v]),
        Repr::List(values) => Ok(values),
        Repr::Text(text) => text
            .split_whitespace()
            .map(|part| {
                part.parse::<f32>()
                    .map_err(|_| E::custom(format!("invalid number '{part}' in \"{text}\"")))
            })
            .collect(),
    }
}

/// A fixed-size float vector.
///
/// A single value is broadcast to every component; a shorter list leaves
/// the remaining components at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floats<const N: usize>(pub [f32; N]);

impl<const N: usize> Floats<N> {
    /// A vector with every component set to `v`.
    pub const fn splat(v: f32) -> Self {
        Self([v; N])
    }
}

impl<const N: usize> Default for Floats<N> {
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> From<Floats<N>> for [f32; N] {
    fn from(v: Floats<N>) -> Self {
        v.0
    }
}

impl<'de, const N: usize> Deserialize<'de> for Floats<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = parse_floats::<D::Error>(Repr::deserialize(deserializer)?)?;
        let mut out = [0.0; N];
        match values.as_slice() {
            [single] => out = [*single; N],
            values => {
                for (slot, value) in out.iter_mut().zip(values) {
                    *slot = *value;
                }
            }
        }
        Ok(Self(out))
    }
}

/// A float vector of any length, as used by shader constants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloatList(pub Vec<f32>);

impl<'de> Deserialize<'de> for FloatList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(parse_floats::<D::Error>(Repr::deserialize(
            deserializer,
        )?)?))
    }
}
