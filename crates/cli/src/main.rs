use std::process::ExitCode;

fn main() -> ExitCode {
    cfpbot_cli::run()
}
