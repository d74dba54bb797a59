use clap::Parser;
use contract_tester::cli::{run_cli, Cli};
use contract_tester::output::{err, supports_color};
use contract_tester::CliError;
use std::process::ExitCode;

fn main() -> ExitCode {
    contract_tester::logging::init();
    let cli = Cli::parse();
    let color = supports_color();

    match run_cli(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            let message = match e.downcast_ref::<CliError>() {
                Some(op_err) => op_err.to_string(),
                None => format!("Unexpected error: {e}"),
            };
            eprintln!("{}", err(&message, color));
            ExitCode::from(2)
        }
    }
}
