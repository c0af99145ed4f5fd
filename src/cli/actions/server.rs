use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub database: String,
    pub jwt_secret: SecretString,
    pub production: bool,
    pub frontend_origins: Vec<String>,
    pub session_ttl_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.jwt_secret)
        .with_production(args.production)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    api::new(
        args.port,
        &args.dsn,
        &args.database,
        auth_config,
        &args.frontend_origins,
    )
    .await
}
