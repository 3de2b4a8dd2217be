use tracing::info;

use super::ClientOptions;

/// Register the folder with the server.
///
/// Writes the local record first; the record is removed again if the server
/// refuses the registration, and kept once the server accepts it.
pub async fn run_register(
    opts: &ClientOptions,
    user: &str,
    host: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = opts.client()?;
    info!("Registering {} for {user}@{host}...", client.folder().display());

    let challenge = client.register(user, host).await?;

    println!("Signature generated");
    println!("  Folder:  {}", client.folder().display());
    match challenge {
        Some(challenge) => println!("  Session: {}", hex::encode(challenge.session_id)),
        None => println!("  Session: unknown (server reply could not be decoded)"),
    }
    println!("  Record:  {}", client.record_path().display());
    Ok(())
}
