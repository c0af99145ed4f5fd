use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let database = matches
        .get_one::<String>("database")
        .cloned()
        .unwrap_or_else(|| "retrovi".to_string());
    let jwt_secret = matches
        .get_one::<String>("jwt-secret")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --jwt-secret")?;
    let production = matches.get_flag("production");
    let frontend_origins: Vec<String> = matches
        .get_many::<String>("frontend-origin")
        .map(|origins| origins.cloned().collect())
        .unwrap_or_default();
    let session_ttl_seconds = matches
        .get_one::<u64>("session-ttl-seconds")
        .copied()
        .unwrap_or(3600);

    Ok(Action::Server(Args {
        port,
        dsn,
        database,
        jwt_secret,
        production,
        frontend_origins,
        session_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "retrovi",
            "--dsn",
            "mongodb://localhost:27017",
            "--jwt-secret",
            "sekreto",
            "--production",
        ]);

        let Ok(Action::Server(args)) = handler(&matches) else {
            panic!("expected a server action");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.dsn, "mongodb://localhost:27017");
        assert_eq!(args.database, "retrovi");
        assert_eq!(args.jwt_secret.expose_secret(), "sekreto");
        assert!(args.production);
        assert_eq!(args.frontend_origins, vec!["http://localhost:5173"]);
        assert_eq!(args.session_ttl_seconds, 3600);
    }
}
