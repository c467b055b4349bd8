//! Flattening generated leads into a CSV table.
//!
//! Each company produces one row per key contact, repeating the company
//! columns; a company without contacts produces a single row whose contact
//! columns are empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use leadgen_core::{CompanyLead, EnrichmentStatus, LeadBatch, PersonContact, PhoneNumber};

use crate::error::ExportError;

pub const COLUMN_COUNT: usize = 27;

/// CSV header, in column order.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "Company Name",
    "Website",
    "Industry",
    "Company Size",
    "Location",
    "Address",
    "Headquarters",
    "LinkedIn",
    "Twitter",
    "Facebook",
    "Instagram",
    "YouTube",
    "WhatsApp",
    "Email Addresses",
    "Phone Numbers",
    "Channel Source",
    "Keywords Matched",
    "Confidence Score",
    "Enrichment Status",
    "Contact Name",
    "Contact Designation",
    "Contact Role",
    "Contact Email",
    "Contact Phone",
    "Contact LinkedIn",
    "Contact Twitter",
    "Contact WhatsApp",
];

const LIST_SEPARATOR: &str = "; ";

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    cells: [String; COLUMN_COUNT],
}

impl LeadRow {
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell value by header name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        HEADER
            .iter()
            .position(|h| *h == column)
            .map(|i| self.cells[i].as_str())
    }
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn phone_cell(phones: &[PhoneNumber]) -> String {
    phones
        .iter()
        .map(|p| {
            if p.has_whatsapp {
                format!("{} (WhatsApp)", p.number)
            } else {
                p.number.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn row(lead: &CompanyLead, contact: Option<&PersonContact>) -> LeadRow {
    let contact_cells: [String; 8] = match contact {
        Some(c) => [
            c.full_name.clone(),
            c.designation.clone(),
            c.role_category.clone(),
            text(c.email.as_ref()),
            text(c.phone.as_ref()),
            text(c.linkedin_url.as_ref()),
            text(c.twitter_url.as_ref()),
            text(c.whatsapp_number.as_ref()),
        ],
        None => Default::default(),
    };
    let [name, designation, role, email, phone, linkedin, twitter, whatsapp] = contact_cells;

    LeadRow {
        cells: [
            lead.company_name.clone(),
            text(lead.website.as_ref()),
            text(lead.industry.as_ref()),
            text(lead.company_size.as_ref()),
            text(lead.location.as_ref()),
            text(lead.main_address.as_ref()),
            text(lead.headquarters.as_ref()),
            text(lead.linkedin_url.as_ref()),
            text(lead.twitter_url.as_ref()),
            text(lead.facebook_url.as_ref()),
            text(lead.instagram_url.as_ref()),
            text(lead.youtube_url.as_ref()),
            text(lead.whatsapp_url.as_ref()),
            lead.email_addresses.join(LIST_SEPARATOR),
            phone_cell(&lead.phone_numbers),
            lead.channel_source.clone(),
            lead.keywords_matched.join(LIST_SEPARATOR),
            format!("{:.2}", lead.confidence_score),
            lead.enrichment_status.to_string(),
            name,
            designation,
            role,
            email,
            phone,
            linkedin,
            twitter,
            whatsapp,
        ],
    }
}

/// One row per (company, contact); contact-less companies get one row.
#[must_use]
pub fn flatten(companies: &[CompanyLead]) -> Vec<LeadRow> {
    let mut rows = Vec::with_capacity(companies.len());
    for lead in companies {
        if lead.key_contacts.is_empty() {
            rows.push(row(lead, None));
        } else {
            rows.extend(lead.key_contacts.iter().map(|c| row(lead, Some(c))));
        }
    }
    rows
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Renders rows as CSV: an unquoted header line, then one line per row with
/// every cell quoted. Lines are joined with `\n` and there is no trailing
/// newline.
#[must_use]
pub fn to_csv(rows: &[LeadRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADER.join(","));
    for row in rows {
        lines.push(
            row.cells
                .iter()
                .map(|c| quote(c))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// `leads_<YYYY-MM-DD>.csv`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("leads_{}.csv", date.format("%Y-%m-%d"))
}

/// Flattens `companies` and writes the CSV to `path`.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be written.
pub fn write_csv(path: &Path, companies: &[CompanyLead]) -> Result<usize, ExportError> {
    let rows = flatten(companies);
    fs::write(path, to_csv(&rows)).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "leads exported");
    Ok(rows.len())
}

/// Totals over a lead batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadSummary {
    pub companies: usize,
    pub contacts: usize,
    pub enriched: usize,
    pub pending: usize,
    pub by_channel: BTreeMap<String, usize>,
}

impl LeadSummary {
    #[must_use]
    pub fn from_companies(companies: &[CompanyLead]) -> Self {
        let mut summary = Self {
            companies: companies.len(),
            ..Self::default()
        };
        for lead in companies {
            summary.contacts += lead.key_contacts.len();
            match lead.enrichment_status {
                EnrichmentStatus::Enriched => summary.enriched += 1,
                EnrichmentStatus::Pending => summary.pending += 1,
            }
            *summary
                .by_channel
                .entry(lead.channel_source.clone())
                .or_default() += 1;
        }
        summary
    }

    #[must_use]
    pub fn from_batch(batch: &LeadBatch) -> Self {
        Self::from_companies(&batch.companies)
    }
}
