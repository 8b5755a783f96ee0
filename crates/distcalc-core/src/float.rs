//! Serde helpers for floats that may be infinite or NaN.
//!
//! JSON has no literal for non-finite numbers and `serde_json` writes them as
//! `null`. These modules write them as the strings `"inf"`, `"-inf"` and
//! `"NaN"` instead, and accept either form back. Finite values stay plain
//! JSON numbers. Use with `#[serde(with = "...")]`.

use serde::de::Error;
use serde::Deserialize;

const INF: &str = "inf";
const NEG_INF: &str = "-inf";
const NAN: &str = "NaN";

fn label(value: f64) -> &'static str {
    if value.is_nan() {
        NAN
    } else if value.is_sign_positive() {
        INF
    } else {
        NEG_INF
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Label(String),
}

impl Repr {
    fn into_f64<E: Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Label(text) => match text.as_str() {
                INF => Ok(f64::INFINITY),
                NEG_INF => Ok(f64::NEG_INFINITY),
                NAN => Ok(f64::NAN),
                other => Err(E::custom(format!("invalid float '{other}'"))),
            },
        }
    }
}

/// `f32` wire operands and results.
pub mod single {
    use super::{label, Repr};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else {
            serializer.serialize_str(label(f64::from(*value)))
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(Repr::deserialize(deserializer)?.into_f64()? as f32)
    }
}

/// `f64` operands stored on an operation.
pub mod double {
    use super::{label, Repr};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(label(*value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }
}

/// Optional `f64` results. Pair with `default` and `skip_serializing_if`.
pub mod double_opt {
    use super::Repr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::double::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Option::<Repr>::deserialize(deserializer)?
            .map(Repr::into_f64)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::single")]
        narrow: f32,
        #[serde(with = "super::double")]
        wide: f64,
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::double_opt")]
        maybe: Option<f64>,
    }

    #[test]
    fn finite_values_stay_numbers() {
        let json = serde_json::to_string(&Sample {
            narrow: 2.5,
            wide: -9.0,
            maybe: Some(0.25),
        })
        .unwrap();
        assert_eq!(json, r#"{"narrow":2.5,"wide":-9.0,"maybe":0.25}"#);
    }

    #[test]
    fn non_finite_values_are_labelled() {
        let json = serde_json::to_string(&Sample {
            narrow: f32::INFINITY,
            wide: f64::NEG_INFINITY,
            maybe: Some(f64::NAN),
        })
        .unwrap();
        assert_eq!(json, r#"{"narrow":"inf","wide":"-inf","maybe":"NaN"}"#);

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back.narrow, f32::INFINITY);
        assert_eq!(back.wide, f64::NEG_INFINITY);
        assert!(back.maybe.is_some_and(f64::is_nan));
    }

    #[test]
    fn integers_and_missing_option_accepted() {
        let back: Sample = serde_json::from_str(r#"{"narrow":3,"wide":4}"#).unwrap();
        assert_eq!(back.narrow, 3.0);
        assert_eq!(back.wide, 4.0);
        assert_eq!(back.maybe, None);
    }

    #[test]
    fn unknown_label_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"narrow":"huge","wide":1}"#).is_err());
    }
}
