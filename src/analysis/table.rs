// Loading, validation and slicing of the candidate table.

use log::debug;
use serde::Deserialize;
use snafu::prelude::*;

use crate::analysis::{
    AnalysisResult, CsvRowParseSnafu, InvalidAgeSnafu, MissingColumnSnafu, OpeningCsvSnafu,
};

/// Elected through the party quotient.
pub const OUTCOME_QUOTIENT: &str = "ELEITO POR QP";
/// Elected through the coalition average.
pub const OUTCOME_AVERAGE: &str = "ELEITO POR MÉDIA";

/// Columns that must be present after the headers are trimmed, checked in this
/// order. The first missing one is reported.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "TAMANHO DO MUNICÍPIO",
    "DS_COMPOSICAO_COLIGACAO",
    "DS_COR_RACA",
    "NR_IDADE_DATA_POSSE",
    "DS_SIT_TOT_TURNO",
];

/// One elected candidate, as retained after validation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Record {
    pub municipality_size: String,
    pub coalition: String,
    pub race: String,
    pub age: u32,
    pub outcome: String,
}

// The row as it comes off the file, before the age is parsed. Extra columns of
// the TSE export are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "TAMANHO DO MUNICÍPIO")]
    municipality_size: String,
    #[serde(rename = "DS_COMPOSICAO_COLIGACAO")]
    coalition: String,
    #[serde(rename = "DS_COR_RACA")]
    race: String,
    #[serde(rename = "NR_IDADE_DATA_POSSE")]
    age: String,
    #[serde(rename = "DS_SIT_TOT_TURNO")]
    outcome: String,
}

/// Reads the CSV file and returns the validated table.
///
/// Column labels are trimmed before the presence check. Rows whose outcome is
/// neither [`OUTCOME_QUOTIENT`] nor [`OUTCOME_AVERAGE`] are dropped silently.
/// The coalition label is rewritten to its parenthesized alias when one exists.
pub fn load_table(path: &str) -> AnalysisResult<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let headers = rdr.headers().context(OpeningCsvSnafu { path })?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return MissingColumnSnafu { column }.fail();
        }
    }

    let mut res: Vec<Record> = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let raw: RawRecord = row.context(CsvRowParseSnafu {})?;
        if raw.outcome != OUTCOME_QUOTIENT && raw.outcome != OUTCOME_AVERAGE {
            continue;
        }
        // Line 1 holds the headers.
        let lineno = idx + 2;
        let age = raw.age.trim().parse::<u32>().ok().context(InvalidAgeSnafu {
            value: raw.age.clone(),
            lineno,
        })?;
        let coalition = coalition_alias(&raw.coalition).unwrap_or(raw.coalition);
        res.push(Record {
            municipality_size: raw.municipality_size,
            coalition,
            race: raw.race,
            age,
            outcome: raw.outcome,
        });
    }
    debug!("load_table: retained {} rows from {:?}", res.len(), path);
    Ok(res)
}

/// The substring strictly between the first pair of parentheses, if any.
/// Unbalanced parentheses count as no match.
fn coalition_alias(label: &str) -> Option<String> {
    let start = label.find('(')?;
    let len = label[start + 1..].find(')')?;
    Some(label[start + 1..start + 1 + len].to_string())
}

/// A municipality-size tier. `Total` is the synthetic all-sizes tier.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Tier {
    Total,
    Pequeno,
    Medio,
    Grande,
}

impl Tier {
    /// All tiers, in the order they appear in every output.
    pub const ALL: [Tier; 4] = [Tier::Total, Tier::Pequeno, Tier::Medio, Tier::Grande];

    /// The exact token carried by the size column, `None` for the all-sizes tier.
    pub fn token(self) -> Option<&'static str> {
        match self {
            Tier::Total => None,
            Tier::Pequeno => Some("PEQUENO"),
            Tier::Medio => Some("MÉDIO"),
            Tier::Grande => Some("GRANDE"),
        }
    }

    /// Lowercase ASCII component used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            Tier::Total => "total",
            Tier::Pequeno => "pequeno",
            Tier::Medio => "medio",
            Tier::Grande => "grande",
        }
    }

    /// Name used in chart titles and in the proportion table.
    pub fn title(self) -> &'static str {
        match self {
            Tier::Total => "Total",
            Tier::Pequeno => "Pequeno",
            Tier::Medio => "Médio",
            Tier::Grande => "Grande",
        }
    }
}

/// The rows belonging to a tier, by exact match on the size column.
pub fn tier_rows(records: &[Record], tier: Tier) -> Vec<&Record> {
    match tier.token() {
        None => records.iter().collect(),
        Some(token) => records
            .iter()
            .filter(|r| r.municipality_size == token)
            .collect(),
    }
}
