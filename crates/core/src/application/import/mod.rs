// CSV Import Use Case

pub mod columns;
pub mod csv;

pub use columns::{ColumnMap, LeadRow};
pub use csv::{parse_csv, CsvRecord};

use crate::domain::{phone, DomainError, Lead, LeadList, Timezone};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalLeadRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const MAX_CONTENT_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_DATA_ROWS: usize = 10_000;
pub const MAX_LIST_NAME_LEN: usize = 128;
const UNKNOWN_NAME: &str = "Unknown";

/// Import request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub user_id: String,
    /// Display name; defaults to the file name without extension
    #[serde(default)]
    pub name: Option<String>,
    pub file_name: String,
    pub content: String,
}

/// A data row that was not imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

/// Import outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub list_id: String,
    pub name: String,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    pub header_detected: bool,
}

/// Rows extracted from a CSV document, before persistence
#[derive(Debug, Clone, Default)]
pub struct ParsedLeads {
    pub rows: Vec<LeadRow>,
    pub skipped: Vec<SkippedRow>,
    pub header_detected: bool,
}

/// Display name of the list
fn list_name(req: &ImportRequest) -> String {
    match req.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let file = req.file_name.trim();
            let stem = file
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .filter(|stem| !stem.is_empty())
                .unwrap_or(file);
            stem.to_string()
        }
    }
}

/// Validate import request
pub fn validate_request(req: &ImportRequest) -> Result<()> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }

    let name = list_name(req);
    if name.is_empty() {
        return Err(AppError::Validation(
            "List name cannot be empty (provide a name or file name)".to_string(),
        ));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(AppError::Validation(format!(
            "List name too long (max {} chars)",
            MAX_LIST_NAME_LEN
        )));
    }

    if req.content.len() > MAX_CONTENT_BYTES {
        return Err(AppError::Validation(format!(
            "CSV content too large: {} bytes (max {} bytes)",
            req.content.len(),
            MAX_CONTENT_BYTES
        )));
    }

    Ok(())
}

/// Parse and map CSV text into lead rows
///
/// The first record is treated as a header when it names a name or phone
/// column; otherwise the fixed positional layout is used.
pub fn extract_leads(content: &str) -> Result<ParsedLeads> {
    let records = parse_csv(content);
    let Some(first) = records.first() else {
        return Err(AppError::Validation("CSV contains no rows".to_string()));
    };

    let (map, data, header_detected) = match ColumnMap::from_header(first) {
        Some(map) => (map, &records[1..], true),
        None => (ColumnMap::positional(), &records[..], false),
    };

    if data.len() > MAX_DATA_ROWS {
        return Err(AppError::Validation(format!(
            "Too many rows: {} (max {})",
            data.len(),
            MAX_DATA_ROWS
        )));
    }

    let mut parsed = ParsedLeads {
        header_detected,
        ..Default::default()
    };

    for record in data {
        let mut row = map.apply(record);

        if phone::digits(&row.phone).is_empty() {
            let reason = if row.phone.is_empty() {
                "Missing phone number".to_string()
            } else {
                DomainError::InvalidPhone(row.phone.clone()).to_string()
            };
            parsed.skipped.push(SkippedRow {
                line: row.line,
                reason,
            });
            continue;
        }

        if row.name.is_empty() {
            row.name = row
                .company
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        }

        parsed.rows.push(row);
    }

    Ok(parsed)
}

/// CSV Import Service
pub struct ImportService {
    lead_repo: Arc<dyn TransactionalLeadRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ImportService {
    pub fn new(
        lead_repo: Arc<dyn TransactionalLeadRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            lead_repo,
            id_provider,
            time_provider,
        }
    }

    /// Import a CSV document as a new lead list
    pub async fn import(&self, req: ImportRequest) -> Result<ImportSummary> {
        execute(
            self.lead_repo.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }
}

/// Execute import use case (list + leads in one transaction)
pub async fn execute(
    lead_repo: &dyn TransactionalLeadRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: ImportRequest,
) -> Result<ImportSummary> {
    validate_request(&req)?;

    let parsed = extract_leads(&req.content)?;
    if parsed.rows.is_empty() {
        return Err(AppError::Validation(format!(
            "No importable leads in {} ({} rows skipped)",
            req.file_name,
            parsed.skipped.len()
        )));
    }

    let now = time_provider.now_millis();
    let name = list_name(&req);
    let mut list = LeadList::new(
        id_provider.generate_id(),
        req.user_id.clone(),
        name.clone(),
        req.file_name.clone(),
        now,
    );
    list.total_leads = parsed.rows.len() as i64;

    let leads: Vec<Lead> = parsed
        .rows
        .into_iter()
        .enumerate()
        .map(|(position, row)| {
            let mut lead = Lead::new(
                id_provider.generate_id(),
                list.id.clone(),
                position as i64,
                row.name,
                row.phone,
                now,
            );
            lead.company = row.company;
            lead.email = row.email;
            lead.additional_phones = row.additional_phones;
            lead
        })
        .collect();

    let unknown_tz = leads
        .iter()
        .filter(|l| l.timezone == Timezone::Unknown)
        .count();
    if unknown_tz > 0 {
        warn!(
            list_id = %list.id,
            unknown_timezone = unknown_tz,
            "Some leads have no recognizable area code"
        );
    }

    let mut tx = lead_repo.begin_import().await?;
    tx.insert_list(&list).await?;
    let inserted = tx.insert_leads(&leads).await?;
    tx.commit().await?;

    info!(
        list_id = %list.id,
        user_id = %list.user_id,
        imported = inserted,
        skipped = parsed.skipped.len(),
        header = parsed.header_detected,
        "CSV import completed"
    );

    Ok(ImportSummary {
        list_id: list.id,
        name,
        imported: leads.len(),
        skipped: parsed.skipped,
        header_detected: parsed.header_detected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> ImportRequest {
        ImportRequest {
            user_id: "user-1".to_string(),
            name: None,
            file_name: "leads.csv".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_validate_user_empty() {
        let mut req = request("a,b");
        req.user_id = " ".to_string();
        let result = validate_request(&req);
        assert!(result.unwrap_err().to_string().contains("user_id"));
    }

    #[test]
    fn test_validate_name_too_long() {
        let mut req = request("a,b");
        req.name = Some("x".repeat(MAX_LIST_NAME_LEN + 1));
        let result = validate_request(&req);
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_content_too_large() {
        let req = request(&"a".repeat(MAX_CONTENT_BYTES + 1));
        let result = validate_request(&req);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_list_name_from_file_name() {
        assert_eq!(list_name(&request("")), "leads");
        let mut req = request("");
        req.name = Some("  Q3 Prospects ".to_string());
        assert_eq!(list_name(&req), "Q3 Prospects");
        req.name = None;
        req.file_name = ".csv".to_string();
        assert_eq!(list_name(&req), ".csv");
    }

    #[test]
    fn test_extract_with_header() {
        let csv = "Name,Phone,Company,Email\n\
                   Ada Lovelace,(212) 555-0100,Engines Ltd,ada@example.com\n\
                   ,4155550101,Acme,\n\
                   Nobody,,,\n";
        let parsed = extract_leads(csv).unwrap();
        assert!(parsed.header_detected);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].name, "Ada Lovelace");
        assert_eq!(parsed.rows[1].name, "Acme");
        assert_eq!(
            parsed.skipped,
            vec![SkippedRow {
                line: 4,
                reason: "Missing phone number".to_string()
            }]
        );
    }

    #[test]
    fn test_extract_without_header_is_positional() {
        let parsed = extract_leads("Ada,2125550100\n,3125550100\n").unwrap();
        assert!(!parsed.header_detected);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].name, UNKNOWN_NAME);
    }

    #[test]
    fn test_extract_invalid_phone_reason() {
        let parsed = extract_leads("name,phone\nAda,call me\n").unwrap();
        assert!(parsed.rows.is_empty());
        assert!(parsed.skipped[0].reason.contains("Invalid phone"));
    }

    #[test]
    fn test_extract_keeps_short_numbers() {
        let parsed = extract_leads("name,phone\nAda,12345\nBob,2125550100\n").unwrap();
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].phone, "12345");
    }

    #[test]
    fn test_extract_empty_document() {
        assert!(extract_leads("\n\n").is_err());
    }

    #[test]
    fn test_extract_too_many_rows() {
        let mut csv = String::from("name,phone\n");
        for i in 0..=MAX_DATA_ROWS {
            csv.push_str(&format!("Lead {},212555{:04}\n", i, i % 10_000));
        }
        let err = extract_leads(&csv).unwrap_err();
        assert!(err.to_string().contains("Too many rows"));
    }
}
