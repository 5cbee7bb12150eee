use std::fmt::{Display, Formatter};
use std::ops::DerefMut;
use std::str::FromStr;

use anyhow::{ensure, Result};
use itertools::Itertools;
use regex::Regex;
use sqlx::{Sqlite, Transaction};

use crate::ramal::{AdministrativeUnit, UnitId};

mod types;

thread_local! {
    static RE_IDENTIFIER: Regex = Regex::new(r#"^[A-Za-z_][A-Za-z0-9_]*$"#).unwrap();
}

/// Name of the table holding the reference units. Always a plain sql identifier,
/// so it is safe to paste into a query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableName(String);

impl Default for TableName {
    fn default() -> Self {
        TableName("t_kelurahan".to_owned())
    }
}

impl FromStr for TableName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ensure!(RE_IDENTIFIER.with(|re| re.is_match(s)), "not a valid table name: {:?}", s);
        Ok(TableName(s.to_owned()))
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    pub id: UnitId,
    pub nama: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<UnitRow> for AdministrativeUnit {
    fn from(row: UnitRow) -> Self {
        Self {
            id: row.id,
            name: row.nama.unwrap_or_default().into(),
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

/// Reads all units from the given table, in the order sqlite scans the table.
pub async fn read_units(tx: &mut Transaction<'_, Sqlite>, table: &TableName) -> Result<Vec<AdministrativeUnit>> {
    // coordinates stored in NUMERIC columns may come back as integers
    let sql = format!(
        "SELECT id, nama, CAST(latitude AS REAL) AS latitude, CAST(longitude AS REAL) AS longitude FROM {}",
        table,
    );

    let rows: Vec<UnitRow> = sqlx::query_as(&sql)
        .fetch_all(tx.deref_mut())
        .await?;

    Ok(rows.into_iter().map(AdministrativeUnit::from).collect_vec())
}


#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::{Connection, SqliteConnection};

    use super::*;

    #[test]
    fn table_name_validation() {
        assert_eq!(TableName::from_str("t_kelurahan").unwrap(), TableName::default());
        assert!(TableName::from_str("_wilayah2").is_ok());

        assert!(TableName::from_str("").is_err());
        assert!(TableName::from_str("2fast").is_err());
        assert!(TableName::from_str("t_kelurahan; DROP TABLE x").is_err());
        assert!(TableName::from_str("\"quoted\"").is_err());
    }

    async fn memory_db() -> Result<SqliteConnection> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Ok(SqliteConnection::connect_with(&options).await?)
    }

    #[tokio::test]
    async fn reads_integer_and_text_ids() -> Result<()> {
        let mut conn = memory_db().await?;

        sqlx::query("CREATE TABLE wilayah (id, nama TEXT, latitude NUMERIC, longitude NUMERIC)")
            .execute(&mut conn)
            .await?;

        sqlx::query("INSERT INTO wilayah VALUES (3171071001, 'Kebon Kacang', -6.19, 106.82), ('0000000007', NULL, -7, 110)")
            .execute(&mut conn)
            .await?;

        let mut tx = conn.begin().await?;
        let units = read_units(&mut tx, &TableName::from_str("wilayah")?).await?;

        assert_eq!(units.len(), 2);

        assert_eq!(units[0].id, UnitId::from(3171071001));
        assert_eq!(units[0].name.as_str(), "Kebon Kacang");
        assert_eq!(units[0].latitude, -6.19);

        assert_eq!(units[1].id, UnitId::from(7));
        assert_eq!(units[1].name.as_str(), "");
        assert_eq!(units[1].latitude, -7.0);
        assert_eq!(units[1].longitude, 110.0);

        Ok(())
    }

    #[tokio::test]
    async fn loads_ids_wider_than_64_bits() -> Result<()> {
        let mut conn = memory_db().await?;

        sqlx::query("CREATE TABLE t_kelurahan (id, nama TEXT, latitude REAL, longitude REAL)")
            .execute(&mut conn)
            .await?;

        // the overflowing literal is stored as REAL, the quoted one stays TEXT
        sqlx::query("INSERT INTO t_kelurahan VALUES \
                (3171071001, 'Kebon Kacang', -6.19, 106.82), \
                (317107100112345678901, 'Far', 50, 50), \
                ('00317107100112345678901', 'Farther', 60, 60)")
            .execute(&mut conn)
            .await?;

        let mut tx = conn.begin().await?;
        let units = read_units(&mut tx, &TableName::default()).await?;

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].region_code()?.as_str(), "31.71.07.1001");

        assert!(units[1].id.to_string().len() > 20, "{}", units[1].id);
        assert!(units[1].region_code().is_err());

        assert_eq!(units[2].id.to_string(), "317107100112345678901");
        assert!(units[2].region_code().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn rejects_text_ids_that_are_not_numbers() -> Result<()> {
        let mut conn = memory_db().await?;

        sqlx::query("CREATE TABLE t_kelurahan (id TEXT, nama TEXT, latitude REAL, longitude REAL)")
            .execute(&mut conn)
            .await?;

        sqlx::query("INSERT INTO t_kelurahan VALUES ('31.71.07.1001', 'Kebon Kacang', -6.19, 106.82)")
            .execute(&mut conn)
            .await?;

        let mut tx = conn.begin().await?;
        assert!(read_units(&mut tx, &TableName::default()).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn missing_table_is_an_error() -> Result<()> {
        let mut conn = memory_db().await?;
        let mut tx = conn.begin().await?;
        assert!(read_units(&mut tx, &TableName::default()).await.is_err());
        Ok(())
    }
}
