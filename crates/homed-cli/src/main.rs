#[tokio::main]
async fn main() {
    std::process::exit(homed_cli::run().await);
}
