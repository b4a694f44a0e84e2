use crate::error::LineError;
use crate::models::{Dataset, DatasetBody, ParsedLine, SchoolRecord};
use crate::parser::{self, LineOutcome};
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

const SAMPLE_DISTRICTS: usize = 5;
const SAMPLE_SCHOOLS: usize = 3;

/// A line that looked like data but could not be split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: String,
    pub error: LineError,
}

/// A row whose district token is all digits. The parser treats a trailing
/// number as the EMIS code, so these need a human look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub district: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub pages_total: usize,
    pub pages_without_text: usize,
    pub lines_seen: usize,
    pub lines_skipped: usize,
    pub schools_without_code: usize,
    pub failures: Vec<LineFailure>,
    pub review: Vec<ReviewItem>,
}

/// Single-pass accumulator: schools grouped by district in encounter order,
/// plus a side log of everything that did not make it into the dataset.
#[derive(Debug, Default)]
pub struct DistrictAccumulator {
    districts: HashMap<String, Vec<SchoolRecord>>,
    report: RunReport,
}

impl DistrictAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        pages.into_iter().fold(Self::new(), |mut acc, page| {
            acc.ingest_page(page.as_deref());
            acc
        })
    }

    pub fn ingest_page(&mut self, page: Option<&str>) {
        self.report.pages_total += 1;
        match page {
            Some(text) => self.ingest_text(text),
            None => self.report.pages_without_text += 1,
        }
    }

    pub fn ingest_text(&mut self, text: &str) {
        for line in text.lines() {
            self.ingest_line(line);
        }
    }

    pub fn ingest_line(&mut self, line: &str) {
        self.record_outcome(line, parser::parse_line(line));
    }

    /// Fold one parse result into the accumulator. A failed line is logged
    /// and kept in the report; it never stops the pass.
    pub fn record_outcome(&mut self, line: &str, outcome: Result<LineOutcome, LineError>) {
        self.report.lines_seen += 1;
        match outcome {
            Ok(LineOutcome::Record(parsed)) => self.push(parsed),
            Ok(LineOutcome::Skip(reason)) => {
                trace!(?reason, line = %line, "skipped line");
                self.report.lines_skipped += 1;
            }
            Err(error) => {
                warn!(line = %line, error = %error, "could not process line");
                self.report.failures.push(LineFailure {
                    line: line.to_string(),
                    error,
                });
            }
        }
    }

    pub fn push(&mut self, parsed: ParsedLine) {
        if parser::is_numeric_token(&parsed.district) {
            warn!(
                district = %parsed.district,
                school = %parsed.name,
                "numeric district token, possible misclassified EMIS code"
            );
            self.report.review.push(ReviewItem {
                district: parsed.district.clone(),
                name: parsed.name.clone(),
                code: parsed.code.clone(),
            });
        }
        if !parsed.has_code() {
            self.report.schools_without_code += 1;
        }

        let (district, record) = parsed.into_record();
        self.districts.entry(district).or_default().push(record);
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    pub fn school_count(&self) -> usize {
        self.districts.values().map(Vec::len).sum()
    }

    /// Assemble the dataset with districts in codepoint order. Records keep
    /// the order they were pushed in.
    pub fn finish(self, key: &str, description: &str) -> (Dataset, RunReport) {
        let total_districts = self.districts.len();
        let districts: BTreeMap<String, Vec<SchoolRecord>> = self.districts.into_iter().collect();

        let dataset = Dataset {
            key: key.to_string(),
            body: DatasetBody {
                description: description.to_string(),
                total_districts: total_districts.to_string(),
                districts,
            },
        };
        (dataset, self.report)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub total_districts: usize,
    pub total_schools: usize,
    pub first_districts: Vec<String>,
    pub sample: Option<(String, Vec<SchoolRecord>)>,
}

impl ExtractionSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let districts = &dataset.body.districts;
        let sample = districts.iter().next().map(|(name, schools)| {
            (
                name.clone(),
                schools.iter().take(SAMPLE_SCHOOLS).cloned().collect(),
            )
        });

        Self {
            total_districts: districts.len(),
            total_schools: dataset.total_schools(),
            first_districts: dataset
                .district_names()
                .take(SAMPLE_DISTRICTS)
                .map(str::to_string)
                .collect(),
            sample,
        }
    }
}
