use std::str::FromStr;

use anyhow::{ensure, Result};
use arcstr::ArcStr;
use derive_more::Display;
use ramal_geo::{Coordinate, Located};
use serde::{Deserialize, Serialize, Serializer};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

pub mod config;
pub mod dataset;
pub mod db;
pub mod forecast;
pub mod resolve;

/// Number of digits in a region code.
const REGION_CODE_DIGITS: usize = 10;

/// Identifier of an administrative unit as stored in the reference dataset.
///
/// The id is kept as canonical decimal text without leading zeros, so ids of
/// any width can be loaded. Whether an id fits into a region code is only
/// checked once a unit has been picked.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[derive(DeserializeFromStr)]
pub struct UnitId(ArcStr);

impl FromStr for UnitId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, s),
        };

        ensure!(
            !digits.is_empty() && digits.bytes().all(|ch| ch.is_ascii_digit()),
            "not a valid unit id: {:?}", s,
        );

        let id = match digits.trim_start_matches('0') {
            "" => "0".to_owned(),
            digits if negative => format!("-{}", digits),
            digits => digits.to_owned(),
        };

        Ok(UnitId(id.into()))
    }
}

impl From<i64> for UnitId {
    fn from(id: i64) -> Self {
        UnitId(id.to_string().into())
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // numeric in json, unless the id is too wide for any integer type
        match self.0.parse::<i64>() {
            Ok(id) => serializer.serialize_i64(id),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

/// A kelurahan (or any other unit) of the reference dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct AdministrativeUnit {
    pub id: UnitId,

    #[serde(rename = "nama")]
    pub name: ArcStr,

    pub latitude: f64,
    pub longitude: f64,
}

impl AdministrativeUnit {
    pub fn region_code(&self) -> Result<RegionCode, MalformedIdentifier> {
        RegionCode::try_from(&self.id)
    }
}

impl Located for AdministrativeUnit {
    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// An adm4 code of the form `AA.BB.CC.DDDD`, as expected by the forecast api.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[derive(SerializeDisplay)]
pub struct RegionCode(String);

impl RegionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&UnitId> for RegionCode {
    type Error = MalformedIdentifier;

    fn try_from(id: &UnitId) -> Result<Self, Self::Error> {
        let digits = id.0.as_str();

        // anything wider than ten digits would get cut off by the split below
        if digits.starts_with('-') || digits.len() > REGION_CODE_DIGITS {
            return Err(MalformedIdentifier(id.clone()));
        }

        let digits = format!("{:0>10}", digits);
        let code = format!("{}.{}.{}.{}", &digits[..2], &digits[2..4], &digits[4..6], &digits[6..]);

        Ok(RegionCode(code))
    }
}

/// The id of a unit can not be rendered as a region code.
#[derive(Debug, Error)]
#[error("unit id {0} does not fit into a 10 digit region code")]
pub struct MalformedIdentifier(pub UnitId);

#[cfg(test)]
mod tests {
    use super::*;

    fn code(id: i64) -> Result<String, MalformedIdentifier> {
        RegionCode::try_from(&UnitId::from(id)).map(|code| code.to_string())
    }

    #[test]
    fn formats_full_width_id() {
        assert_eq!(code(3171071001).unwrap(), "31.71.07.1001");
    }

    #[test]
    fn formats_zero_padded_id() {
        assert_eq!(code(7).unwrap(), "00.00.00.0007");
        assert_eq!(code(0).unwrap(), "00.00.00.0000");
        assert_eq!(code(1101012001).unwrap(), "11.01.01.2001");
    }

    #[test]
    fn code_is_always_thirteen_chars() {
        for id in [0, 1, 42, 123456, 9_999_999_999] {
            assert_eq!(code(id).unwrap().len(), 13, "id {}", id);
        }
    }

    #[test]
    fn rejects_ids_wider_than_ten_digits() {
        let err = code(10_000_000_000).unwrap_err();
        assert_eq!(err.0, UnitId::from(10_000_000_000));

        assert!(code(31710710011).is_err());
        assert!(code(i64::MAX).is_err());
    }

    #[test]
    fn rejects_negative_ids() {
        assert!(code(-1).is_err());
        assert!(code(i64::MIN).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = RegionCode::try_from(&UnitId::from(3171071001)).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""31.71.07.1001""#);
    }

    #[test]
    fn parses_unit_ids() {
        assert_eq!(UnitId::from_str("3171071001").unwrap(), UnitId::from(3171071001));
        assert_eq!(UnitId::from_str("0000000007").unwrap(), UnitId::from(7));
        assert_eq!(UnitId::from_str("0000").unwrap(), UnitId::from(0));
        assert_eq!(UnitId::from_str("-0042").unwrap(), UnitId::from(-42));

        assert!(UnitId::from_str("").is_err());
        assert!(UnitId::from_str("-").is_err());
        assert!(UnitId::from_str("31.71.07.1001").is_err());
        assert!(UnitId::from_str(" 7").is_err());
    }

    #[test]
    fn ids_wider_than_any_integer_are_kept() {
        let id = UnitId::from_str("317107100112345678901").unwrap();
        assert_eq!(id.to_string(), "317107100112345678901");

        let err = RegionCode::try_from(&id).unwrap_err();
        assert_eq!(err.0, id);

        // leading zeros do not count towards the width
        let padded = UnitId::from_str("000003171071001").unwrap();
        assert_eq!(RegionCode::try_from(&padded).unwrap().as_str(), "31.71.07.1001");
    }

    #[test]
    fn unit_id_serializes_as_number_when_possible() {
        assert_eq!(serde_json::to_string(&UnitId::from(3171071001)).unwrap(), "3171071001");

        let wide = UnitId::from_str("317107100112345678901").unwrap();
        assert_eq!(serde_json::to_string(&wide).unwrap(), r#""317107100112345678901""#);
    }
}
