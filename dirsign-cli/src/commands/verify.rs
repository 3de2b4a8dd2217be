use tracing::info;

use super::ClientOptions;

/// Verify the folder against its registration.
pub async fn run_verify(opts: &ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    let client = opts.client()?;
    if !client.has_record() {
        return Err(format!(
            "No local record at {}. Run `dirsign register` first.",
            client.record_path().display()
        )
        .into());
    }

    info!("Verifying {}...", client.folder().display());
    client.verify().await?;

    println!("Same signature");
    Ok(())
}
