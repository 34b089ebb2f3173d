use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match dossier_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dossier: {e}");
            ExitCode::FAILURE
        }
    }
}
