use clap::Parser;

/// Computes distribution tables and charts for elected municipal councilwomen.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The CSV file with one row per elected candidate. Columns follow the
    /// TSE export naming (TAMANHO DO MUNICÍPIO, DS_COMPOSICAO_COLIGACAO, DS_COR_RACA,
    /// NR_IDADE_DATA_POSSE, DS_SIT_TOT_TURNO).
    #[clap(value_parser)]
    pub input: String,

    /// (directory path) Where the summary CSV files and PNG charts are written.
    /// Created if missing; existing files are overwritten.
    #[clap(long, value_parser, default_value = "out")]
    pub out_dir: String,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
