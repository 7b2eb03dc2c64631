//! Maps parsed CLI arguments to an [`Action`] carrying its configuration.

use crate::cli::{actions::Action, commands};
use crate::config::Config;
use crate::session::{Credentials, Registration, Role};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or the configuration is
/// invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let config = config(matches)?;

    match matches.subcommand_name() {
        Some("status") => Ok(Action::Status { config }),
        Some("logout") => Ok(Action::Logout { config }),
        Some("login") => {
            let m = sub_matches(matches, "login")?;
            Ok(Action::Login {
                config,
                credentials: Credentials::new(required(m, "email")?, required(m, "password")?),
            })
        }
        Some("register") => {
            let m = sub_matches(matches, "register")?;
            let role = m
                .get_one::<String>("role")
                .map(|value| value.parse::<Role>())
                .transpose()
                .map_err(|err| anyhow!(err))?;

            Ok(Action::Register {
                config,
                registration: Registration {
                    name: required(m, "name")?,
                    email: required(m, "email")?,
                    password: SecretString::from(required(m, "password")?),
                    password_confirm: SecretString::from(required(m, "password-confirm")?),
                    role,
                },
            })
        }
        Some("check") => {
            let m = sub_matches(matches, "check")?;
            Ok(Action::Check {
                config,
                path: m.get_one::<String>("path").cloned(),
            })
        }
        Some(other) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("no command given")),
    }
}

fn sub_matches<'a>(matches: &'a clap::ArgMatches, subcommand: &str) -> Result<&'a clap::ArgMatches> {
    matches
        .subcommand_matches(subcommand)
        .context("arguments not found")
}

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --{name}"))
}

fn config(matches: &clap::ArgMatches) -> Result<Config> {
    let api_url = matches
        .get_one::<String>(commands::ARG_API_URL)
        .context("missing required argument: --api-url")?;
    let session_file = matches
        .get_one::<String>(commands::ARG_SESSION_FILE)
        .map(PathBuf::from)
        .context("missing required argument: --session-file")?;
    let timeout = matches
        .get_one::<u64>(commands::ARG_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(crate::config::DEFAULT_TIMEOUT_SECONDS);

    Config::new(api_url, session_file, timeout)
}
