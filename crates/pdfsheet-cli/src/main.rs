mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::annot::AnnotAction;

#[derive(Parser)]
#[command(
    name = "pdfsheet",
    version,
    about = "Convert PDF tables to xlsx workbooks and edit PDF annotations"
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more PDFs into xlsx workbooks
    Convert {
        /// PDF files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Put all tables of a document into a single sheet
        #[arg(short, long)]
        merge: bool,

        /// Directory for the workbooks (default: next to each PDF)
        #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// JSON settings file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show the sheets a PDF would produce, without writing anything
    Inspect {
        /// PDF file
        input_file: PathBuf,

        /// Put all tables into a single sheet
        #[arg(short, long)]
        merge: bool,

        /// Output format: table (default) or json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// List and edit the annotations of a PDF
    Annot {
        #[command(subcommand)]
        action: AnnotAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pdfsheet_core=info"
    } else {
        "pdfsheet_core=warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            files,
            merge,
            out_dir,
            config,
            output,
        } => commands::convert::run(files, merge, out_dir, config, output),
        Commands::Inspect {
            input_file,
            merge,
            output,
        } => commands::inspect::run(&input_file, merge, output),
        Commands::Annot { action } => commands::annot::run(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
