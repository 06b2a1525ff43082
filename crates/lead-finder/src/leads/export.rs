use super::artifact::{artifact_filename, CsvArtifact};
use super::domain::Lead;
use super::store::SearchResults;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadColumn {
    Name,
    Email,
    Phone,
    Website,
    Address,
    Cuisine,
    Price,
    Rating,
    Reviews,
    Sentiment,
    Hygiene,
    HygieneRating,
    CompanyNumber,
    CompanyStatus,
    AdditionalEmails,
    AdditionalPhones,
}

impl LeadColumn {
    pub const fn header(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Website => "Website",
            Self::Address => "Address",
            Self::Cuisine => "Cuisine",
            Self::Price => "Price",
            Self::Rating => "Rating",
            Self::Reviews => "Reviews",
            Self::Sentiment => "Sentiment",
            Self::Hygiene => "Hygiene",
            Self::HygieneRating => "Hygiene Rating",
            Self::CompanyNumber => "Company Number",
            Self::CompanyStatus => "Company Status",
            Self::AdditionalEmails => "Additional Emails",
            Self::AdditionalPhones => "Additional Phones",
        }
    }

    /// Text rendering of this column for one lead; absent values are empty.
    pub fn value(self, lead: &Lead) -> String {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }

        match self {
            Self::Name => lead.name.clone(),
            Self::Email => text(&lead.email),
            Self::Phone => text(&lead.phone),
            Self::Website => text(&lead.website),
            Self::Address => lead.address.clone(),
            Self::Cuisine => text(&lead.cuisine_type),
            Self::Price => lead
                .price_level
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            Self::Rating => lead.rating.map(|r| r.to_string()).unwrap_or_default(),
            Self::Reviews => lead.total_reviews.map(|n| n.to_string()).unwrap_or_default(),
            Self::Sentiment => lead
                .sentiment_tier()
                .map(|tier| tier.label().to_string())
                .unwrap_or_default(),
            Self::Hygiene => lead
                .hygiene_tier()
                .map(|tier| tier.label().to_string())
                .unwrap_or_default(),
            Self::HygieneRating => lead
                .hygiene_rating
                .as_ref()
                .and_then(|hygiene| hygiene.rating.as_ref())
                .map(ToString::to_string)
                .unwrap_or_default(),
            Self::CompanyNumber => lead
                .company_info
                .as_ref()
                .and_then(|info| info.company_number.clone())
                .unwrap_or_default(),
            Self::CompanyStatus => lead
                .company_info
                .as_ref()
                .and_then(|info| info.company_status.clone())
                .unwrap_or_default(),
            Self::AdditionalEmails => lead.additional_emails.join("; "),
            Self::AdditionalPhones => lead.additional_phones.join("; "),
        }
    }
}

/// Fixed column projections offered for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProfile {
    Contact,
    #[default]
    Standard,
    Extended,
}

impl ExportProfile {
    const CONTACT: &'static [LeadColumn] = &[
        LeadColumn::Name,
        LeadColumn::Email,
        LeadColumn::Phone,
        LeadColumn::Website,
        LeadColumn::Address,
    ];

    const STANDARD: &'static [LeadColumn] = &[
        LeadColumn::Name,
        LeadColumn::Email,
        LeadColumn::Phone,
        LeadColumn::Website,
        LeadColumn::Address,
        LeadColumn::Cuisine,
        LeadColumn::Price,
        LeadColumn::Rating,
        LeadColumn::Reviews,
    ];

    const EXTENDED: &'static [LeadColumn] = &[
        LeadColumn::Name,
        LeadColumn::Email,
        LeadColumn::Phone,
        LeadColumn::Website,
        LeadColumn::Address,
        LeadColumn::Cuisine,
        LeadColumn::Price,
        LeadColumn::Rating,
        LeadColumn::Reviews,
        LeadColumn::Sentiment,
        LeadColumn::Hygiene,
        LeadColumn::HygieneRating,
        LeadColumn::CompanyNumber,
        LeadColumn::CompanyStatus,
        LeadColumn::AdditionalEmails,
        LeadColumn::AdditionalPhones,
    ];

    pub const fn columns(self) -> &'static [LeadColumn] {
        match self {
            Self::Contact => Self::CONTACT,
            Self::Standard => Self::STANDARD,
            Self::Extended => Self::EXTENDED,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Standard => "standard",
            Self::Extended => "extended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "contact" => Some(Self::Contact),
            "standard" => Some(Self::Standard),
            "extended" | "full" => Some(Self::Extended),
            _ => None,
        }
    }
}

/// How field values are quoted.
///
/// Both modes quote every data field. `Legacy` reproduces the historical
/// format byte for byte and leaves embedded `"` untouched, which corrupts
/// rows whose values contain quotes. `Standard` doubles embedded quotes per
/// RFC 4180. For quote-free data the two modes produce identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    #[default]
    Standard,
    Legacy,
}

impl QuoteMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "rfc4180" => Some(Self::Standard),
            "legacy" => Some(Self::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Ready(CsvArtifact),
    /// Nothing to export; no artifact is produced.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExporter {
    columns: Vec<LeadColumn>,
    quoting: QuoteMode,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(ExportProfile::default(), QuoteMode::default())
    }
}

impl CsvExporter {
    pub fn new(profile: ExportProfile, quoting: QuoteMode) -> Self {
        Self::with_columns(profile.columns().to_vec(), quoting)
    }

    pub fn with_columns(columns: Vec<LeadColumn>, quoting: QuoteMode) -> Self {
        Self { columns, quoting }
    }

    pub fn quoting(&self) -> QuoteMode {
        self.quoting
    }

    /// Builds the downloadable artifact for a result set, named after its
    /// search term.
    pub fn export(&self, results: &SearchResults) -> Result<ExportOutcome, ExportError> {
        let Some(bytes) = self.render(results.leads())? else {
            debug!(search_term = results.search_term(), "nothing to export");
            return Ok(ExportOutcome::Skipped);
        };

        let filename = artifact_filename(results.search_term());
        info!(
            %filename,
            rows = results.leads().len(),
            columns = self.columns.len(),
            "csv export ready"
        );
        Ok(ExportOutcome::Ready(CsvArtifact { filename, bytes }))
    }

    /// Renders the header line followed by one line per lead, joined by `\n`
    /// with no trailing newline. Returns `None` for an empty sequence.
    pub fn render(&self, leads: &[Lead]) -> Result<Option<Vec<u8>>, ExportError> {
        if leads.is_empty() {
            return Ok(None);
        }

        let header = self
            .columns
            .iter()
            .map(|column| column.header())
            .collect::<Vec<_>>()
            .join(",");
        let mut buffer = header.into_bytes();

        match self.quoting {
            QuoteMode::Legacy => {
                for lead in leads {
                    let row = self
                        .columns
                        .iter()
                        .map(|column| format!("\"{}\"", column.value(lead)))
                        .collect::<Vec<_>>()
                        .join(",");
                    buffer.push(b'\n');
                    buffer.extend_from_slice(row.as_bytes());
                }
            }
            QuoteMode::Standard => {
                buffer.push(b'\n');
                let mut writer = csv::WriterBuilder::new()
                    .quote_style(csv::QuoteStyle::Always)
                    .terminator(csv::Terminator::Any(b'\n'))
                    .from_writer(buffer);
                for lead in leads {
                    writer.write_record(self.columns.iter().map(|column| column.value(lead)))?;
                }
                buffer = writer.into_inner().map_err(|err| err.into_error())?;
                if buffer.last() == Some(&b'\n') {
                    buffer.pop();
                }
            }
        }

        Ok(Some(buffer))
    }
}
