//! The analysis pipeline: load the candidate table, slice it by municipality
//! size, aggregate, and publish CSV tables and PNG charts.

pub mod aggregate;
pub mod export;
pub mod plots;
pub mod table;

use std::fs;
use std::path::Path;

use log::{debug, info};
use snafu::{prelude::*, Snafu};

use crate::analysis::table::Tier;

#[derive(Debug, Snafu)]
pub enum AnalysisError {
    #[snafu(display("Error opening input file {path}: {source}"))]
    OpeningCsv { source: csv::Error, path: String },

    #[snafu(display("Required column '{column}' was not found in the input file"))]
    MissingColumn { column: String },

    #[snafu(display("Error reading a row from the input file: {source}"))]
    CsvRowParse { source: csv::Error },

    #[snafu(display("Invalid age value '{value}' on line {lineno} of the input file"))]
    InvalidAge { value: String, lineno: usize },

    #[snafu(display("Error creating output directory {path}: {source}"))]
    CreatingOutputDir { source: std::io::Error, path: String },

    #[snafu(display("Error writing table {path}: {source}"))]
    WritingCsv { source: csv::Error, path: String },

    #[snafu(display("Error flushing table {path}: {source}"))]
    FlushingCsv { source: std::io::Error, path: String },

    #[snafu(display("Error drawing chart {path}: {message}"))]
    Drawing { message: String, path: String },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Runs the whole pipeline over one input file.
///
/// Any error aborts the remaining steps; nothing is retried. Output files of a
/// previous run with the same names are overwritten.
pub fn run_analysis(input: &str, out_dir: &Path) -> AnalysisResult<()> {
    let records = table::load_table(input)?;
    info!("Loaded {} elected candidates from {:?}", records.len(), input);

    fs::create_dir_all(out_dir).context(CreatingOutputDirSnafu {
        path: out_dir.display().to_string(),
    })?;

    for tier in Tier::ALL {
        let rows = table::tier_rows(&records, tier);
        debug!("tier {:?}: {} rows", tier, rows.len());

        let races = aggregate::race_counts(&rows);
        export::write_counts(
            out_dir,
            &format!("dados_raca_{}.csv", tier.slug()),
            "DS_COR_RACA",
            &races,
        )?;
        plots::bar_chart(
            &races,
            &format!("Distribuição de Raça - {}", tier.title()),
            &out_dir.join(format!("grafico_raca_{}.png", tier.slug())),
        )?;

        let coalitions = aggregate::top_coalitions(&rows, aggregate::TOP_COALITIONS);
        export::write_counts(
            out_dir,
            &format!("dados_coligacoes_{}.csv", tier.slug()),
            "DS_COMPOSICAO_COLIGACAO",
            &coalitions,
        )?;
        plots::bar_chart(
            &coalitions,
            &format!("Top 10 Coligações - {}", tier.title()),
            &out_dir.join(format!("grafico_coligacoes_{}.png", tier.slug())),
        )?;

        let ages = aggregate::age_counts(&rows);
        export::write_counts(
            out_dir,
            &format!("dados_idades_{}.csv", tier.slug()),
            "NR_IDADE_DATA_POSSE",
            &ages,
        )?;
        plots::age_histogram(
            &ages,
            &format!("Distribuição de Idades - {}", tier.title()),
            &out_dir.join(format!("grafico_idades_{}.png", tier.slug())),
        )?;
    }

    // The election-mode breakdown covers all four tiers in one table.
    let shares = aggregate::outcome_shares(&records);
    export::write_shares(out_dir, "dados_eleitos_proporcao.csv", &shares)?;
    plots::outcome_share_chart(&shares, &out_dir.join("grafico_eleitos_proporcao.png"))?;

    Ok(())
}
