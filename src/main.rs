use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    bilreg::log::init_tracing();
    bilreg::cli::run()
}
