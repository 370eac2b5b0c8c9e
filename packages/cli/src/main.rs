use std::path::PathBuf;

use clap::Parser;

use flatstore_cli::{resolve_config, run, Command};

/// flatstore - read and write nested JSON values in a flat path table
#[derive(Parser, Debug)]
#[command(name = "flatstore")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Store file (defaults to FLATSTORE_PATH, then file_db.json)
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Indentation width of the store file, 0 for compact
    #[arg(long)]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = resolve_config(args.file, args.indent);
    let mut stdout = std::io::stdout();
    if let Err(e) = run(config, &args.command, &mut stdout).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
