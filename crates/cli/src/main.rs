use std::process::ExitCode;

fn main() -> ExitCode {
    oilwise_cli::run()
}
