pub mod session;

use crate::{
    config::Config,
    session::{Credentials, Registration},
};

#[derive(Debug)]
pub enum Action {
    Status { config: Config },
    Login { config: Config, credentials: Credentials },
    Register { config: Config, registration: Registration },
    Logout { config: Config },
    Check { config: Config, path: Option<String> },
}

impl Action {
    #[must_use]
    pub const fn config(&self) -> &Config {
        match self {
            Self::Status { config }
            | Self::Login { config, .. }
            | Self::Register { config, .. }
            | Self::Logout { config }
            | Self::Check { config, .. } => config,
        }
    }
}
