use std::process::ExitCode;

fn main() -> ExitCode {
    match jira_creator::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Command failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
