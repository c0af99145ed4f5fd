pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("retrovi")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("RETROVI_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("MongoDB connection string")
                .env("RETROVI_DSN")
                .required(true),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .help("Database name")
                .default_value("retrovi")
                .env("RETROVI_DATABASE"),
        )
        .arg(
            Arg::new("jwt-secret")
                .long("jwt-secret")
                .help("Shared secret used to sign session credentials")
                .env("RETROVI_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("production")
                .long("production")
                .help("Enable the production cookie policy (Secure, SameSite=None)")
                .env("RETROVI_PRODUCTION")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("frontend-origin")
                .long("frontend-origin")
                .help("Allowed CORS origin, may be repeated")
                .env("RETROVI_FRONTEND_ORIGIN")
                .default_value("http://localhost:5173")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session credential TTL in seconds")
                .env("RETROVI_SESSION_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "retrovi");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_dsn() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "retrovi",
            "--port",
            "8080",
            "--dsn",
            "mongodb://localhost:27017",
            "--jwt-secret",
            "sekreto",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>("dsn").map(String::as_str),
            Some("mongodb://localhost:27017")
        );
        assert_eq!(
            matches.get_one::<String>("jwt-secret").map(String::as_str),
            Some("sekreto")
        );
        assert_eq!(
            matches.get_one::<String>("database").map(String::as_str),
            Some("retrovi")
        );
        assert!(!matches.get_flag("production"));
        assert_eq!(
            matches.get_one::<u64>("session-ttl-seconds").copied(),
            Some(3600)
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("RETROVI_PORT", Some("443")),
                ("RETROVI_DSN", Some("mongodb://db.example.test:27017")),
                ("RETROVI_DATABASE", Some("lostandfound")),
                ("RETROVI_JWT_SECRET", Some("sekreto")),
                ("RETROVI_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["retrovi"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("dsn").map(String::as_str),
                    Some("mongodb://db.example.test:27017")
                );
                assert_eq!(
                    matches.get_one::<String>("database").map(String::as_str),
                    Some("lostandfound")
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("RETROVI_LOG_LEVEL", Some(level)),
                    ("RETROVI_DSN", Some("mongodb://localhost:27017")),
                    ("RETROVI_JWT_SECRET", Some("sekreto")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["retrovi"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").copied(),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("RETROVI_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "retrovi".to_string(),
                    "--dsn".to_string(),
                    "mongodb://localhost:27017".to_string(),
                    "--jwt-secret".to_string(),
                    "sekreto".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_frontend_origin_repeats() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "retrovi",
            "--dsn",
            "mongodb://localhost:27017",
            "--jwt-secret",
            "sekreto",
            "--frontend-origin",
            "http://localhost:5173",
            "--frontend-origin",
            "https://retrovi.example.test",
        ]);

        let origins: Vec<&String> = matches
            .get_many::<String>("frontend-origin")
            .map(Iterator::collect)
            .unwrap_or_default();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://retrovi.example.test");
    }
}
