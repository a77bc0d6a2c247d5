use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "invoice-merge")]
#[command(about = "Generates invoice documents from spreadsheet data")]
pub struct CliArgs {
    /// Path to the TOML job configuration file
    #[arg(short, long, default_value = "invoice-config.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    pub monitor: Option<bool>,

    /// Fetch and group the data but do not produce any documents
    #[arg(long)]
    pub dry_run: bool,
}
