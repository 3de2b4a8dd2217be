use dirsign_core::crypto::hash_password;

/// Print the account hash for a server `users.accounts` entry.
pub async fn run_hash_password(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }
    println!("{}", hash_password(password));
    Ok(())
}
