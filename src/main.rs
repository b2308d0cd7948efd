use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskshelf_lib::{utils::logging, ConfigChanges, ExportOverrides};

#[derive(Parser)]
#[command(name = "taskshelf", version, about = "Checklist store and listing-page CSV exporter")]
struct Cli {
    /// Settings file (created on first `config` change)
    #[arg(long, global = true, default_value = "taskshelf.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the task list (default)
    Tasks {
        /// Task store file, overriding the configured one
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Fetch the configured listing pages and write every record to CSV
    Export(ExportArgs),
    /// Print the settings, or change them when flags are given
    Config(ConfigArgs),
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    first_page: Option<u32>,
    #[arg(long)]
    last_page: Option<u32>,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    base_url: Option<String>,
    /// Page path joined onto the base URL; `{page}` becomes the page number
    #[arg(long)]
    page_path: Option<String>,
    #[arg(long)]
    first_page: Option<u32>,
    #[arg(long)]
    last_page: Option<u32>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Tasks { db: None }) {
        Commands::Tasks { db } => taskshelf_lib::run_task_list(cli.settings, db)?,
        Commands::Export(args) => {
            let summary = taskshelf_lib::run_export(
                cli.settings,
                ExportOverrides {
                    output_path: args.output,
                    first_page: args.first_page,
                    last_page: args.last_page,
                },
            )?;
            println!(
                "Data saved to {} ({} records)",
                summary.output_path.display(),
                summary.records
            );
        }
        Commands::Config(args) => {
            let settings = taskshelf_lib::run_config(
                cli.settings,
                ConfigChanges {
                    base_url: args.base_url,
                    page_path: args.page_path,
                    first_page: args.first_page,
                    last_page: args.last_page,
                    output_path: args.output,
                    timeout_secs: args.timeout_secs,
                    db_path: args.db,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
