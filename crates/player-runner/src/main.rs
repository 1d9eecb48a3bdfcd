//! aruCraftR Panel - headless client for the panel API
//!
//! This crate is the *composition root*: it assembles the adapters, wires
//! them to the app services and runs one command against the backend.

mod composition;
mod run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run::run().await
}
