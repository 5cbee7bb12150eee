use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::ramal::db::TableName;
use crate::ramal::forecast::ForecastUrl;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RamalConfig {
    #[serde(default = "http_address_default")]
    pub http_address: String,

    // template of the weather forecast url, `{}` is replaced by the region code
    #[serde(default, deserialize_with = "deserialize_from_str")]
    pub forecast_url: ForecastUrl,

    #[serde(with = "serde_yaml::with::singleton_map")]
    pub dataset: DatasetConfig,
}

/// Where the reference units are read from. Written as a single key map,
/// e.g. `dataset: { sqlite: { url: ... } }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetConfig {
    Sqlite(SqliteConfig),
    Csv(CsvConfig),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqliteConfig {
    /// sqlite database url, e.g. `sqlite://indonesia_geo.db`
    pub url: String,

    #[serde(default, deserialize_with = "deserialize_from_str")]
    pub table: TableName,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvConfig {
    /// Path to a csv file, optionally gzip compressed.
    pub path: PathBuf,
}

pub fn load(path: impl AsRef<Path>) -> Result<RamalConfig> {
    let path = path.as_ref();
    let fp = File::open(path).with_context(|| format!("open config file {:?}", path))?;
    let config = serde_yaml::from_reader(fp).with_context(|| format!("parse config file {:?}", path))?;
    Ok(config)
}

fn http_address_default() -> String {
    "127.0.0.1:3000".to_owned()
}

fn deserialize_from_str<'de, D, T>(deserialize: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = anyhow::Error>,
{
    let value = String::deserialize(deserialize)?;
    T::from_str(&value).map_err(|err| Error::custom(format!("{:#}", err)))
}
