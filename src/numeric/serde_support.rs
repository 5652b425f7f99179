// ============================================================================
// Serde Support
// Wire representation for fixed-point values (feature = "serde")
// ============================================================================
//
// Magnitudes travel as decimal strings of the raw integer: JSON numbers
// cannot carry 256-bit integers without loss.
//
// FixedDecimal<P> accepts three input shapes:
// - "1500000000"  raw scaled integer (exact)
// - 10            whole units
// - 1.5           float, rounded half away from zero

use super::fixed_decimal::FixedDecimal;
use super::fixed_point::FixedPointValue;
use super::precision::Precision;
use num_bigint::BigInt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

#[derive(Serialize, Deserialize)]
struct RawValue {
    magnitude: String,
    precision: u32,
}

impl Serialize for FixedPointValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawValue {
            magnitude: self.magnitude().to_string(),
            precision: self.precision(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FixedPointValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawValue::deserialize(deserializer)?;
        let magnitude: BigInt = raw.magnitude.trim().parse().map_err(de::Error::custom)?;
        Ok(FixedPointValue::from_raw(magnitude, raw.precision))
    }
}

impl<P: Precision> Serialize for FixedDecimal<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self.raw_value())
    }
}

struct FixedDecimalVisitor<P>(PhantomData<P>);

impl<'de, P: Precision> Visitor<'de> for FixedDecimalVisitor<P> {
    type Value = FixedDecimal<P>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a raw integer string or a number in units of {} ({} decimals)",
            P::NAME,
            P::DECIMALS
        )
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<BigInt>()
            .map(|raw| FixedDecimal::from_raw(raw))
            .map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(FixedDecimal::from_integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(FixedDecimal::from_integer(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        FixedDecimal::from_f64(v).map_err(E::custom)
    }
}

impl<'de, P: Precision> Deserialize<'de> for FixedDecimal<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FixedDecimalVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::UsdValue;
    use crate::precision_tag;

    precision_tag!(SixDecimals = 6);

    #[test]
    fn test_parse_string_as_raw_magnitude() {
        let x: UsdValue = serde_json::from_str("\"1000000000\"").unwrap();
        assert_eq!(x, UsdValue::from_integer(1));

        let neg: UsdValue = serde_json::from_str("\"-500000000\"").unwrap();
        assert_eq!(neg.to_string(), "-0.5");
    }

    #[test]
    fn test_parse_numbers_as_units() {
        let int: UsdValue = serde_json::from_str("10").unwrap();
        assert_eq!(int.raw_value().to_string(), "10000000000");

        let float: UsdValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(float.raw_value().to_string(), "1500000000");

        let six: FixedDecimal<SixDecimals> = serde_json::from_str("1.5").unwrap();
        assert_eq!(six.raw_value().to_string(), "1500000");
    }

    #[test]
    fn test_parse_arrays() {
        let values: Vec<UsdValue> = serde_json::from_str(r#"["1000", "2000", 3.5]"#).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].raw_value().to_string(), "1000");
        assert_eq!(values[2].raw_value().to_string(), "3500000000");
    }

    #[test]
    fn test_rejects_invalid_shapes() {
        assert!(serde_json::from_str::<UsdValue>(r#"{"invalid": "object"}"#).is_err());
        assert!(serde_json::from_str::<UsdValue>("null").is_err());
        assert!(serde_json::from_str::<UsdValue>("\"12abc\"").is_err());
    }

    #[test]
    fn test_serialize_as_raw_string() {
        let x = UsdValue::from_integer(2);
        assert_eq!(serde_json::to_string(&x).unwrap(), "\"2000000000\"");
    }

    #[test]
    fn test_untagged_value_round_trip() {
        let value = FixedPointValue::from_raw(-12345, 2);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"magnitude":"-12345","precision":2}"#);

        let back: FixedPointValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.magnitude(), value.magnitude());
        assert_eq!(back.precision(), 2);
    }
}
