//! md5ls - content manifests for directory trees
//!
//! Entry point for the md5ls CLI application.

use clap::Parser;
use md5ls::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are not failures
            let code = if err.use_stderr() {
                ExitCode::InvalidInput.as_i32()
            } else {
                ExitCode::Success.as_i32()
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    let json_errors = cli.json_errors;

    match md5ls::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::from_error(&err);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
