use std::process::ExitCode;

fn main() -> ExitCode {
    maxim_cli::run()
}
