// Writing aggregate tables as CSV files into the output directory.

use std::fmt::Display;
use std::path::Path;

use log::debug;
use snafu::prelude::*;

use crate::analysis::aggregate::OutcomeShare;
use crate::analysis::{AnalysisResult, FlushingCsvSnafu, WritingCsvSnafu};

/// Writes one aggregate as `<key>,<count>` rows, in the aggregate's order.
/// An existing file of the same name is overwritten.
pub fn write_counts<K: Display>(
    out_dir: &Path,
    file_name: &str,
    key_header: &str,
    rows: &[(K, u64)],
) -> AnalysisResult<()> {
    let path = out_dir.join(file_name);
    let shown = path.display().to_string();

    let mut wtr = csv::Writer::from_path(&path).context(WritingCsvSnafu {
        path: shown.clone(),
    })?;
    wtr.write_record([key_header, "QUANTIDADE"])
        .context(WritingCsvSnafu {
            path: shown.clone(),
        })?;
    for (key, count) in rows {
        wtr.write_record([key.to_string(), count.to_string()])
            .context(WritingCsvSnafu {
                path: shown.clone(),
            })?;
    }
    wtr.flush().context(FlushingCsvSnafu { path: shown })?;

    debug!("write_counts: {} rows into {:?}", rows.len(), file_name);
    Ok(())
}

/// Writes the four-tier election-mode table, one row per tier.
pub fn write_shares(
    out_dir: &Path,
    file_name: &str,
    shares: &[OutcomeShare],
) -> AnalysisResult<()> {
    let path = out_dir.join(file_name);
    let shown = path.display().to_string();

    let mut wtr = csv::Writer::from_path(&path).context(WritingCsvSnafu {
        path: shown.clone(),
    })?;
    wtr.write_record(["TAMANHO DO MUNICÍPIO", "PCT_ELEITO_QP", "PCT_ELEITO_MEDIA"])
        .context(WritingCsvSnafu {
            path: shown.clone(),
        })?;
    for share in shares {
        let label = share.tier.token().unwrap_or("TOTAL");
        wtr.write_record([
            label.to_string(),
            share.pct_quotient.to_string(),
            share.pct_average.to_string(),
        ])
        .context(WritingCsvSnafu {
            path: shown.clone(),
        })?;
    }
    wtr.flush().context(FlushingCsvSnafu { path: shown })?;

    debug!("write_shares: {} rows into {:?}", shares.len(), file_name);
    Ok(())
}
