use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::warn;
use supernote_reader::{Notebook, PageGeometry};

/// Convert a Supernote .note notebook into a PDF document.
#[derive(Debug, Parser)]
#[command(name = "supernote-reader", version)]
struct Cli {
    /// Path to the .note file
    input: PathBuf,

    /// Output PDF path (defaults to <input stem>.pdf next to the input)
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Skip PDF output
    #[arg(long, conflicts_with = "pdf")]
    no_pdf: bool,

    /// Also write one PNG per page into this directory
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Write the metadata tree as JSON to this path
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Print the metadata tree as JSON
    #[arg(long)]
    print_metadata: bool,

    /// Portrait page width in pixels
    #[arg(long, default_value_t = PageGeometry::default().width)]
    width: u32,

    /// Portrait page height in pixels
    #[arg(long, default_value_t = PageGeometry::default().height)]
    height: u32,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    println!("Reading notebook: {}", cli.input.display());
    println!("{}", "=".repeat(60));

    let geometry = PageGeometry::new(cli.width, cli.height);
    let notebook = match Notebook::open_with_geometry(&cli.input, geometry) {
        Ok(notebook) => notebook,
        Err(e) => {
            eprintln!("\nERROR: Failed to read notebook");
            eprintln!("  {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("\nNotebook Information:");
    println!("  Type: {}", notebook.file_type());
    println!("  Signature: {}", notebook.signature());
    println!("  Pages: {}", notebook.pages().len());
    println!("  Keywords: {}", notebook.keywords().len());
    println!("  Links: {}", notebook.links().len());
    for (i, page) in notebook.pages().iter().enumerate() {
        let names: Vec<&str> = page.layers.iter().map(|layer| layer.name.as_str()).collect();
        println!(
            "  {}. {:?} [{}]",
            i + 1,
            page.orientation,
            names.join(", ")
        );
    }

    if let Err(e) = run_outputs(&cli, &notebook) {
        eprintln!("\nERROR: Conversion failed");
        eprintln!("  {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run_outputs(cli: &Cli, notebook: &Notebook) -> supernote_reader::Result<()> {
    if cli.print_metadata {
        println!("{}", notebook.metadata_json()?);
    }

    if let Some(path) = &cli.metadata {
        notebook.export_metadata(path)?;
        println!("\nMetadata written to {}", path.display());
    }

    if let Some(dir) = &cli.png_dir {
        let written = notebook.export_png(dir)?;
        println!("\n{} PNG pages written to {}", written.len(), dir.display());
    }

    if !cli.no_pdf {
        if notebook.pages().is_empty() {
            warn!("Notebook has no pages, the PDF will be empty");
        }
        let path = cli
            .pdf
            .clone()
            .unwrap_or_else(|| cli.input.with_extension("pdf"));
        notebook.export_pdf(&path)?;
        println!("\nPDF written to {}", path.display());
    }

    Ok(())
}
