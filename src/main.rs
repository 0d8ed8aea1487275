mod app;
mod audio;
mod certificate;
mod commands;
mod config;
mod curriculum;
mod launcher;
mod lesson;
mod logging;
mod quiz;
mod setup;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
