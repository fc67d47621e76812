//! CSV import of reseller spreadsheets.
//!
//! Headers follow the source spreadsheets (`razao_social`, `cnpj`,
//! `endereco`, ...). Rows replace any stored record with the same CNPJ.

use std::collections::HashSet;

use revloc_core::{cnpj, CoordinateSource, Coordinates, NewReseller, DEFAULT_HOURS};
use serde::Serialize;
use thiserror::Error;

use crate::store::{ResellerStore, StoreError};

const SNIFF_BYTES: usize = 1024;
const DEFAULT_SERVICE_RADIUS_KM: f64 = 10.0;
const NAME_COLUMN: &str = "razao_social";
const CNPJ_COLUMN: &str = "cnpj";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    pub total_imported: usize,
    pub errors: Vec<String>,
    pub message: String,
}

/// Rows accepted from a file, plus per-row problems.
#[derive(Debug, Clone, Default)]
pub struct ParsedImport {
    pub records: Vec<NewReseller>,
    pub errors: Vec<String>,
    pub duplicates: usize,
}

/// `;` when the first KiB contains one, otherwise `,`.
#[must_use]
pub fn detect_delimiter(data: &[u8]) -> u8 {
    let sample = &data[..data.len().min(SNIFF_BYTES)];
    if sample.contains(&b';') {
        b';'
    } else {
        b','
    }
}

/// Parse a CSV file into new records.
///
/// # Errors
///
/// Returns [`ImportError::MissingColumn`] if `razao_social` or `cnpj` is not
/// a header, or [`ImportError::Csv`] if the header row cannot be read.
/// Problems with individual rows are collected in [`ParsedImport::errors`].
pub fn parse_csv(data: &[u8]) -> Result<ParsedImport, ImportError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(data))
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let name_idx = column(NAME_COLUMN).ok_or(ImportError::MissingColumn(NAME_COLUMN))?;
    let cnpj_idx = column(CNPJ_COLUMN).ok_or(ImportError::MissingColumn(CNPJ_COLUMN))?;
    let columns = Columns {
        name: name_idx,
        cnpj: cnpj_idx,
        address: column("endereco"),
        neighborhood: column("bairro"),
        city: column("cidade"),
        state: column("uf"),
        cep: column("cep"),
        phone: column("telefone"),
        whatsapp: column("whatsapp"),
        active: column("ativo"),
        service_radius_km: column("service_radius_km"),
        priority: column("prioridade"),
        latitude: column("latitude"),
        longitude: column("longitude"),
    };

    let mut parsed = ParsedImport::default();
    let mut seen = HashSet::new();
    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                parsed.errors.push(format!("line {line}: {e}"));
                continue;
            }
        };
        match columns.parse_row(&row) {
            Ok(record) => {
                let key = record.cnpj.clone().unwrap_or_default();
                if seen.insert(key) {
                    parsed.records.push(record);
                } else {
                    parsed.duplicates += 1;
                }
            }
            Err(reason) => parsed.errors.push(format!("line {line}: {reason}")),
        }
    }

    Ok(parsed)
}

/// Parse `data` and replace stored records sharing its CNPJs.
///
/// The replacement goes through [`ResellerStore::replace_by_cnpj`], so a
/// failed batch leaves the previously stored records in place.
///
/// Never fails: a fatal problem yields `success = false` with the error in
/// `errors`.
pub async fn import_csv(store: &dyn ResellerStore, data: &[u8]) -> ImportReport {
    match try_import(store, data).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "CSV import failed");
            ImportReport {
                success: false,
                total_imported: 0,
                errors: vec![e.to_string()],
                message: format!("Import failed: {e}"),
            }
        }
    }
}

async fn try_import(store: &dyn ResellerStore, data: &[u8]) -> Result<ImportReport, ImportError> {
    let parsed = parse_csv(data)?;
    if parsed.duplicates > 0 {
        tracing::info!(duplicates = parsed.duplicates, "dropped duplicate CNPJs from import");
    }

    let mut total_imported = 0;
    if !parsed.records.is_empty() {
        let outcome = store.replace_by_cnpj(&parsed.records).await?;
        total_imported = usize::try_from(outcome.inserted).unwrap_or(usize::MAX);
        tracing::info!(
            removed = outcome.removed,
            inserted = outcome.inserted,
            rejected = parsed.errors.len(),
            "CSV import stored"
        );
    }

    Ok(ImportReport {
        success: true,
        total_imported,
        message: format!("{total_imported} resellers imported."),
        errors: parsed.errors,
    })
}

struct Columns {
    name: usize,
    cnpj: usize,
    address: Option<usize>,
    neighborhood: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    cep: Option<usize>,
    phone: Option<usize>,
    whatsapp: Option<usize>,
    active: Option<usize>,
    service_radius_km: Option<usize>,
    priority: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn parse_row(&self, row: &csv::StringRecord) -> Result<NewReseller, String> {
        let cell = |idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i))
                .map(clean_cell)
                .unwrap_or_default()
        };

        let name = cell(Some(self.name));
        if name.is_empty() {
            return Err(format!("missing {NAME_COLUMN}"));
        }
        let raw_cnpj = cell(Some(self.cnpj));
        if !cnpj::is_present(&raw_cnpj) {
            return Err(format!("missing {CNPJ_COLUMN}"));
        }
        let normalized = cnpj::normalize(&raw_cnpj);
        if !cnpj::validate(&normalized) {
            return Err(format!("invalid CNPJ '{raw_cnpj}'"));
        }

        let number = |idx: Option<usize>| cell(idx).replace(',', ".").parse::<f64>().ok();
        let coordinates = match (number(self.latitude), number(self.longitude)) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)).filter(Coordinates::is_valid),
            _ => None,
        };

        Ok(NewReseller {
            name,
            cnpj: Some(normalized),
            address: cell(self.address),
            neighborhood: cell(self.neighborhood),
            city: cell(self.city),
            state: cell(self.state),
            cep: cell(self.cep),
            phone: cell(self.phone),
            whatsapp: cell(self.whatsapp),
            hours: DEFAULT_HOURS.to_string(),
            coordinates,
            geocoding_source: coordinates.map(|_| CoordinateSource::NormalizedData),
            active: parse_flag(&cell(self.active)).unwrap_or(true),
            data_enriched: coordinates.is_some(),
            service_radius_km: Some(
                number(self.service_radius_km)
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .unwrap_or(DEFAULT_SERVICE_RADIUS_KM),
            ),
            priority: number(self.priority).map_or(0, truncate_priority),
        })
    }
}

/// Trimmed cell text; spreadsheet placeholders for "nothing" become empty.
fn clean_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "nan" | "null" | "none" => String::new(),
        _ => trimmed.to_string(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "1.0" | "true" | "t" | "sim" | "s" | "yes" | "y" | "verdadeiro" => Some(true),
        "0" | "0.0" | "false" | "f" | "nao" | "não" | "n" | "no" | "falso" => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_priority(value: f64) -> i32 {
    if value.is_finite() {
        value.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
