use pgcsvlog::runtime::{boot, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let config = boot::boot()?;
    run::run(&config).await.map_err(|e| {
        tracing::error!("Ingest failed: {}", e);
        e
    })?;
    Ok(())
}
