pub mod logging;

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_SESSION_FILE};
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

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

    let command = Command::new("vending-admin")
        .about("Vending machine administration console")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the vending machine REST API")
                .env("VENDING_ADMIN_API_URL")
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("File holding the persisted session token and cached profile")
                .env("VENDING_ADMIN_SESSION_FILE")
                .default_value(DEFAULT_SESSION_FILE)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("HTTP request timeout in seconds")
                .env("VENDING_ADMIN_TIMEOUT_SECONDS")
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .subcommand(Command::new("status").about("Show the current operator session"))
        .subcommand(
            Command::new("login")
                .about("Sign in and persist the session token")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("VENDING_ADMIN_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("VENDING_ADMIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account and sign in with it")
                .arg(Arg::new("name").long("name").help("Display name").required(true))
                .arg(Arg::new("email").long("email").help("Account email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password: 8+ characters with an uppercase letter, a number and a special character")
                        .env("VENDING_ADMIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("password-confirm")
                        .long("password-confirm")
                        .help("Password confirmation")
                        .required(true),
                )
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("Requested role")
                        .value_parser(["admin", "user"]),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the stored session"))
        .subcommand(
            Command::new("check")
                .about("Show whether the current session may open a console route")
                .arg(
                    Arg::new("path")
                        .help("Route path, for example /users; every route when omitted"),
                ),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "vending-admin");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Vending machine administration console"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("VENDING_ADMIN_API_URL", None::<&str>),
                ("VENDING_ADMIN_SESSION_FILE", None),
                ("VENDING_ADMIN_TIMEOUT_SECONDS", None),
                ("VENDING_ADMIN_LOG_LEVEL", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["vending-admin", "status"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some(DEFAULT_API_BASE_URL)
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_SESSION_FILE).map(String::as_str),
                    Some(DEFAULT_SESSION_FILE)
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_SECONDS).copied(), Some(10));
                assert_eq!(matches.subcommand_name(), Some("status"));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("VENDING_ADMIN_API_URL", Some("http://localhost:3000/api")),
                ("VENDING_ADMIN_SESSION_FILE", Some("/tmp/session.json")),
                ("VENDING_ADMIN_TIMEOUT_SECONDS", Some("3")),
                ("VENDING_ADMIN_EMAIL", Some("admin@vendingmachine.gp")),
                ("VENDING_ADMIN_PASSWORD", Some("secret")),
                ("VENDING_ADMIN_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["vending-admin", "login"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).map(String::as_str),
                    Some("http://localhost:3000/api")
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_SECONDS).copied(), Some(3));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let (name, login) = matches.subcommand().unwrap();
                assert_eq!(name, "login");
                assert_eq!(
                    login.get_one::<String>("email").map(String::as_str),
                    Some("admin@vendingmachine.gp")
                );
                assert_eq!(
                    login.get_one::<String>("password").map(String::as_str),
                    Some("secret")
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_u8 {
            temp_env::with_vars([("VENDING_ADMIN_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["vending-admin".to_string(), "logout".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index as usize)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index)
                );
            });
        }
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let result = new().try_get_matches_from(vec![
            "vending-admin",
            "register",
            "--name",
            "Jane",
            "--email",
            "jane@vendingmachine.gp",
            "--password",
            "Vending#2025",
            "--password-confirm",
            "Vending#2025",
            "--role",
            "owner",
        ]);
        assert!(result.is_err());
    }
}
