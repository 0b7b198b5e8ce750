use std::process::ExitCode;

use basc_drv::{Config, Session};

fn main() -> ExitCode {
    let config = match Config::parse(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::from(2);
        }
    };

    if !config.quiet {
        println!("basc BASIC cross-compiler");
    }

    match Session::new(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
