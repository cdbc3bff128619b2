use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfworks")]
#[command(about = "PDF page tools as an HTTP service, an MCP server, or one-off commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service (primary mode)
    Serve {
        /// Configuration file (defaults to ./pdfworks.* when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run as MCP server over stdio
    Mcp,

    /// Display PDF metadata
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Reorder, drop, or duplicate pages into a new PDF
    #[command(alias = "cat")]
    Organize {
        /// PDF file to read
        path: PathBuf,

        /// Page order (e.g., "1,3,2,4-7")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Fail on out-of-range pages and reversed ranges instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// Extract a contiguous page range to a new PDF
    Split {
        /// PDF file to read
        path: PathBuf,

        /// First page (1-based, inclusive)
        #[arg(long)]
        start: i64,

        /// Last page (1-based, inclusive)
        #[arg(long)]
        end: i64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Clamp the range to the document instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Shrink every page by a margin on all four sides
    Crop {
        /// PDF file to read
        path: PathBuf,

        /// Margin in points
        #[arg(short, long, default_value = "50", allow_negative_numbers = true)]
        margin: i64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Refuse margins that would invert a page
        #[arg(long)]
        strict: bool,
    },

    /// Combine multiple PDFs into one
    Merge {
        /// PDF files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}
