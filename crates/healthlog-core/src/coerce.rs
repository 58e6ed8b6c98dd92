//! Lenient number decoding for model-supplied arguments.
//!
//! Models routinely emit `20.0` or `"20"` where a schema asks for an integer.
//! These helpers accept any JSON number or numeric string that denotes the
//! target value exactly, and reject everything else.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

fn number_from(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn to_u32(value: &Value) -> Option<u32> {
  if let Some(n) = value.as_u64() {
    return u32::try_from(n).ok();
  }
  if let Value::String(s) = value
    && let Ok(n) = s.trim().parse::<u32>()
  {
    return Some(n);
  }
  let f = number_from(value)?;
  (f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f)).then_some(f as u32)
}

pub(crate) fn uint<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
  let value = Value::deserialize(d)?;
  to_u32(&value).ok_or_else(|| {
    D::Error::custom(format!("expected a non-negative whole number, got {value}"))
  })
}

pub(crate) fn opt_uint<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<Option<u32>, D::Error> {
  match Value::deserialize(d)? {
    Value::Null => Ok(None),
    value => to_u32(&value).map(Some).ok_or_else(|| {
      D::Error::custom(format!("expected a non-negative whole number, got {value}"))
    }),
  }
}

pub(crate) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
  let value = Value::deserialize(d)?;
  number_from(&value)
    .ok_or_else(|| D::Error::custom(format!("expected a number, got {value}")))
}
