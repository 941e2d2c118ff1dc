//! Chatpulse CLI binary entrypoint.

fn main() {
    if let Err(err) = chatpulse_cli::app::run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
