use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::ramal::config::DatasetConfig;
use crate::ramal::db::{self, TableName};
use crate::ramal::AdministrativeUnit;

/// Read-only access to the reference units.
#[async_trait]
pub trait Dataset: Send + Sync {
    /// Loads all units, in the iteration order of the underlying store.
    /// Every call goes back to the store, nothing is cached.
    async fn units(&self) -> Result<Vec<AdministrativeUnit>>;
}

/// Opens the dataset described by the configuration. This never touches the
/// store itself, so a broken store only shows up once units are requested.
pub fn open(config: &DatasetConfig) -> Result<Arc<dyn Dataset>> {
    let dataset: Arc<dyn Dataset> = match config {
        DatasetConfig::Sqlite(sqlite) => Arc::new(SqliteDataset::open(&sqlite.url, sqlite.table.clone())?),
        DatasetConfig::Csv(csv) => Arc::new(CsvDataset::new(&csv.path)),
    };

    Ok(dataset)
}

#[derive(Clone)]
pub struct SqliteDataset {
    db: SqlitePool,
    table: TableName,
}

impl SqliteDataset {
    pub fn open(url: &str, table: TableName) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("parse sqlite url {:?}", url))?
            .read_only(true);

        let db = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);

        Ok(Self { db, table })
    }
}

#[async_trait]
impl Dataset for SqliteDataset {
    async fn units(&self) -> Result<Vec<AdministrativeUnit>> {
        let mut tx = self.db.begin().await.context("open reference database")?;
        let units = db::read_units(&mut tx, &self.table).await?;
        tx.commit().await?;

        debug!(table = %self.table, "Loaded {} units from database", units.len());
        Ok(units)
    }
}

/// Units stored in a csv file with the columns `id,nama,latitude,longitude`.
/// Files ending in `.gz` are decompressed on the fly.
#[derive(Clone)]
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Dataset for CsvDataset {
    async fn units(&self) -> Result<Vec<AdministrativeUnit>> {
        let path = self.path.clone();
        let units = spawn_blocking(move || parse_csv(&path)).await??;

        debug!(path = ?self.path, "Loaded {} units from csv", units.len());
        Ok(units)
    }
}

fn parse_csv(path: &Path) -> Result<Vec<AdministrativeUnit>> {
    let fp = File::open(path).with_context(|| format!("open {:?}", path))?;

    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    let input: Box<dyn Read> = if is_gzip { Box::new(GzDecoder::new(fp)) } else { Box::new(fp) };

    let mut r = csv::Reader::from_reader(input);

    let mut units = Vec::<AdministrativeUnit>::new();
    for record in r.deserialize() {
        units.push(record.with_context(|| format!("parse {:?}", path))?);
    }

    Ok(units)
}
