use clap::Parser;
use std::process::ExitCode;

use symsweep::cli::{Cli, Output};
use symsweep::error::exit_code_for;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::default().error(&format!("Error: {e:#}"));
            let code = exit_code_for(&e).clamp(1, 255);
            ExitCode::from(code as u8)
        }
    }
}
