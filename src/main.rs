use std::process::ExitCode;

fn main() -> ExitCode {
    match jsoncsv::run() {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(jsoncsv::FAILURE_EXIT_CODE)
        }
    }
}
