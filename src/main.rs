mod app;
mod catalog;
mod config;
mod engine;
mod mpris;
mod persist;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
