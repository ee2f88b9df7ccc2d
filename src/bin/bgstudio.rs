//! bgstudio server binary
//!
//! Serves background removal, backdrop compositing and optional Stable
//! Diffusion enhancement over HTTP.

#[cfg(feature = "cli")]
use bgstudio::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
