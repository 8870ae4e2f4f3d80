use crate::app_lib::config::{
    DEFAULT_API_BASE_URL, ENV_API_BASE_URL, ENV_HINT_PATH, ENV_REQUEST_TIMEOUT_MS,
};
use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_HINT_FILE: &str = "hint-file";
pub const ARG_TOKEN: &str = "token";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the kudos API")
                .env(ENV_API_BASE_URL)
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("Request timeout in milliseconds, 0 disables it")
                .env(ENV_REQUEST_TIMEOUT_MS)
                .default_value("10000")
                .global(true),
        )
        .arg(
            Arg::new(ARG_HINT_FILE)
                .long("hint-file")
                .help("File remembering the last signed-in user id")
                .env(ENV_HINT_PATH)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TOKEN)
                .long("token")
                .help("Bearer token from `kudos login --print-token`")
                .env("KUDOS_TOKEN")
                .hide_env_values(true)
                .global(true),
        )
}
