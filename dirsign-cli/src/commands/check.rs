use super::{register, verify, ClientOptions};

/// Verify when a local record exists, otherwise register.
pub async fn run_check(
    opts: &ClientOptions,
    user: &str,
    host: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if opts.client()?.has_record() {
        verify::run_verify(opts).await
    } else {
        register::run_register(opts, user, host).await
    }
}
