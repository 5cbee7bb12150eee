use std::str::FromStr;

use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Sqlite, TypeInfo, ValueRef};

use crate::ramal::UnitId;

impl sqlx::Type<Sqlite> for UnitId {
    fn type_info() -> SqliteTypeInfo {
        <i64 as sqlx::Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<Sqlite>>::compatible(ty)
            || <f64 as sqlx::Type<Sqlite>>::compatible(ty)
            || <str as sqlx::Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for UnitId {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.type_info().name() {
            // some datasets keep the id as a zero padded string
            "TEXT" => {
                let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
                Ok(UnitId::from_str(text)?)
            }

            // integers too large for 64 bits are stored as REAL by sqlite
            "REAL" => {
                let value = <f64 as Decode<'r, Sqlite>>::decode(value)?;
                if !value.is_finite() || value.fract() != 0.0 {
                    return Err(format!("not a valid unit id: {}", value).into());
                }

                Ok(UnitId::from_str(&format!("{:.0}", value))?)
            }

            _ => {
                let value = <i64 as Decode<'r, Sqlite>>::decode(value)?;
                Ok(UnitId::from(value))
            }
        }
    }
}
