#[tokio::main]
async fn main() {
    if let Err(e) = voicerec::app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
