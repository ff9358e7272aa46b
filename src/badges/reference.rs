use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::config::ReferenceConfig;

/// Failure to load one of the static reference tables.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("unable to open reference file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed reference table: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to read notable accounts: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of the Pacific a country sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacificRim {
    East,
    West,
}

/// Classification row for a canonical country name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryInfo {
    pub name: String,
    pub is_global_south: bool,
    pub pacific_rim: Option<PacificRim>,
}

/// ISO canonicalisation plus the classification table keyed by canonical name.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    names_by_iso: BTreeMap<String, String>,
    info_by_name: BTreeMap<String, CountryInfo>,
}

impl CountryTable {
    /// Build from `iso,name` and `name,is_global_south,pacific_rim` CSV exports.
    pub fn from_readers<C: Read, I: Read>(codes: C, info: I) -> Result<Self, ReferenceDataError> {
        let mut names_by_iso = BTreeMap::new();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(codes);
        for row in reader.deserialize::<CountryCodeRow>() {
            let row = row?;
            names_by_iso.insert(row.iso.to_ascii_uppercase(), row.name);
        }

        let mut info_by_name = BTreeMap::new();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(info);
        for row in reader.deserialize::<CountryInfoRow>() {
            let row = row?;
            info_by_name.insert(
                row.name.clone(),
                CountryInfo {
                    name: row.name,
                    is_global_south: row.is_global_south,
                    pacific_rim: row.pacific_rim,
                },
            );
        }

        Ok(Self {
            names_by_iso,
            info_by_name,
        })
    }

    pub fn name_for_iso(&self, iso: &str) -> Option<&str> {
        self.names_by_iso
            .get(&iso.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn info(&self, name: &str) -> Option<&CountryInfo> {
        self.info_by_name.get(name)
    }

    /// Canonical names on one side of the Pacific Rim, sorted alphabetically.
    pub fn pacific_rim(&self, side: PacificRim) -> Vec<&str> {
        self.info_by_name
            .values()
            .filter(|info| info.pacific_rim == Some(side))
            .map(|info| info.name.as_str())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CountryCodeRow {
    iso: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountryInfoRow {
    name: String,
    #[serde(deserialize_with = "flag")]
    is_global_south: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pacific_rim: Option<PacificRim>,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean flag, found '{other}'"
        ))),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<PacificRim>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "east" => Ok(Some(PacificRim::East)),
            "west" => Ok(Some(PacificRim::West)),
            other => Err(serde::de::Error::custom(format!(
                "unknown pacific rim side '{other}'"
            ))),
        },
    }
}

/// Curated high-profile accounts, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct NotableAccounts {
    handles: BTreeSet<String>,
}

impl NotableAccounts {
    pub fn new<I, S>(handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            handles: handles
                .into_iter()
                .map(|handle| normalize_handle(handle.as_ref()))
                .filter(|handle| !handle.is_empty())
                .collect(),
        }
    }

    /// One handle per line; blank lines and `#` comments are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceDataError> {
        let mut handles = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            handles.push(trimmed.to_string());
        }
        Ok(Self::new(handles))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(&normalize_handle(handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

/// Static lookup tables shared read-only by every rule evaluation.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub countries: CountryTable,
    pub notable_accounts: NotableAccounts,
}

impl ReferenceData {
    pub fn new(countries: CountryTable, notable_accounts: NotableAccounts) -> Self {
        Self {
            countries,
            notable_accounts,
        }
    }

    /// Build from in-memory country code, country info and notable account sources.
    pub fn from_readers<C: Read, I: Read, N: Read>(
        codes: C,
        info: I,
        notable: N,
    ) -> Result<Self, ReferenceDataError> {
        let countries = CountryTable::from_readers(codes, info)?;
        let notable_accounts = NotableAccounts::from_reader(notable)?;
        Ok(Self::new(countries, notable_accounts))
    }

    pub fn load(config: &ReferenceConfig) -> Result<Self, ReferenceDataError> {
        let codes = open(&config.country_codes_path())?;
        let info = open(&config.country_info_path())?;
        let notable = open(&config.notable_accounts_path())?;
        let loaded = Self::from_readers(codes, info, notable)?;

        tracing::info!(
            reference_dir = %config.reference_dir().display(),
            notable_accounts = loaded.notable_accounts.len(),
            "loaded badge reference data"
        );

        Ok(loaded)
    }
}

fn open(path: &Path) -> Result<File, ReferenceDataError> {
    File::open(path).map_err(|source| ReferenceDataError::Open {
        path: path.to_path_buf(),
        source,
    })
}
