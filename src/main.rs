use clap::Parser as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use toylang_frontend::driver::{check_file, CheckOptions};

#[derive(clap::Parser, Debug)]
#[command(name = "tlc", about = "Scan and validate a program")]
struct Args {
    /// Input source file (.mc)
    input: PathBuf,

    /// Skip the token listing and only validate the program
    #[arg(long)]
    no_tokens: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let opts = CheckOptions { list_tokens: !args.no_tokens };
    let mut stdout = std::io::stdout();

    match check_file(&args.input, &opts, &mut stdout) {
        Ok(report) if report.is_success() => println!("no errors"),
        Ok(report) => {
            eprintln!("syntax analysis found errors:");
            for diag in &report.diagnostics {
                eprintln!("{}", diag.render_human());
            }
            std::process::exit(1);
        }
        Err(diag) => {
            eprintln!("{}", diag.render_human());
            std::process::exit(1);
        }
    }
}
