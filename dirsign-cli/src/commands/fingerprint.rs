use std::path::Path;

use dirsign_core::fingerprint::Fingerprinter;

use super::ClientOptions;

/// Print the folder fingerprint without contacting the server.
pub async fn run_fingerprint(opts: &ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    let folder = opts.folder()?;
    println!("{}", fingerprint_of(&folder, &opts.store_file)?);
    Ok(())
}

fn fingerprint_of(folder: &Path, store_file: &str) -> Result<String, Box<dyn std::error::Error>> {
    Ok(Fingerprinter::new(folder).exclude(store_file).compute()?)
}
