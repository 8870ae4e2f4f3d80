use crate::{
    app_lib::{config::parse_timeout_ms, AppConfig},
    cli::{
        actions::{
            auth::{LoginArgs, SignupArgs},
            members::MembersCommand,
            orgs::OrgsCommand,
            Action,
        },
        commands::{auth, connection, kudos, orgs},
        globals::GlobalArgs,
    },
    features::{
        auth::types::{Role, SignupRequest},
        kudos::types::{GiveKudosRequest, KudosFilter},
        orgs::types::CreateOrgRequest,
    },
};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches
        .get_one::<String>(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Builds the shared settings from the global args.
///
/// # Errors
/// Returns an error if the API URL or timeout is invalid.
pub fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_base_url = required(matches, connection::ARG_API_URL)?;
    let request_timeout = match matches.get_one::<String>(connection::ARG_TIMEOUT_MS) {
        Some(value) => parse_timeout_ms(value)?,
        None => AppConfig::default().request_timeout,
    };

    let config = AppConfig {
        api_base_url: api_base_url.trim().to_string(),
        request_timeout,
        hint_path: optional(matches, connection::ARG_HINT_FILE).map(PathBuf::from),
    };
    config.validate().context("invalid --api-url")?;

    let mut globals = GlobalArgs::new(config);
    if let Some(token) = optional(matches, connection::ARG_TOKEN) {
        globals.set_token(SecretString::from(token));
    }
    Ok(globals)
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((auth::CMD_SIGNUP, sub)) => Ok(Action::Signup(SignupArgs {
            request: SignupRequest {
                email: required(sub, auth::ARG_EMAIL)?.trim().to_string(),
                first_name: required(sub, auth::ARG_FIRST_NAME)?.trim().to_string(),
                last_name: required(sub, auth::ARG_LAST_NAME)?.trim().to_string(),
            },
            print_token: sub.get_flag(auth::ARG_PRINT_TOKEN),
        })),
        Some((auth::CMD_LOGIN, sub)) => Ok(Action::Login(LoginArgs {
            email: required(sub, auth::ARG_EMAIL)?.trim().to_string(),
            print_token: sub.get_flag(auth::ARG_PRINT_TOKEN),
        })),
        Some((auth::CMD_SESSION, _)) => Ok(Action::Session),
        Some((auth::CMD_LOGOUT, _)) => Ok(Action::Logout),
        Some((orgs::CMD_ORGS, sub)) => orgs_handler(sub).map(Action::Orgs),
        Some((orgs::CMD_MEMBERS, sub)) => members_handler(sub).map(Action::Members),
        Some((kudos::CMD_GIVE, sub)) => Ok(Action::Give(GiveKudosRequest {
            recipient_id: required(sub, kudos::ARG_TO)?,
            message: required(sub, kudos::ARG_MESSAGE)?,
            category: optional(sub, kudos::ARG_CATEGORY),
        })),
        Some((kudos::CMD_LIST, sub)) => Ok(Action::List(KudosFilter {
            page: sub.get_one::<u32>(kudos::ARG_PAGE).copied(),
            limit: sub.get_one::<u32>(kudos::ARG_LIMIT).copied(),
            recipient_id: optional(sub, kudos::ARG_RECIPIENT),
            team_id: optional(sub, kudos::ARG_TEAM),
        })),
        Some((kudos::CMD_ANALYTICS, _)) => Ok(Action::Analytics),
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    }
}

fn orgs_handler(matches: &ArgMatches) -> Result<OrgsCommand> {
    match matches.subcommand() {
        Some((orgs::CMD_LIST, _)) => Ok(OrgsCommand::List),
        Some((orgs::CMD_CREATE, sub)) => Ok(OrgsCommand::Create(CreateOrgRequest {
            name: required(sub, orgs::ARG_NAME)?,
            description: optional(sub, orgs::ARG_DESCRIPTION),
        })),
        Some((orgs::CMD_JOIN, sub)) => Ok(OrgsCommand::Join {
            invite_code: required(sub, orgs::ARG_CODE)?,
        }),
        Some((other, _)) => bail!("unknown orgs command: {other}"),
        None => bail!("missing orgs command"),
    }
}

fn members_handler(matches: &ArgMatches) -> Result<MembersCommand> {
    match matches.subcommand() {
        Some((orgs::CMD_LIST, sub)) => Ok(MembersCommand::List {
            org_id: required(sub, orgs::ARG_ORG)?,
        }),
        Some((orgs::CMD_ROLE, sub)) => Ok(MembersCommand::Role {
            org_id: required(sub, orgs::ARG_ORG)?,
            user_id: required(sub, orgs::ARG_USER)?,
            role: required(sub, orgs::ARG_ROLE)?
                .parse::<Role>()
                .map_err(|err| anyhow!(err))?,
        }),
        Some((orgs::CMD_REMOVE, sub)) => Ok(MembersCommand::Remove {
            org_id: required(sub, orgs::ARG_ORG)?,
            user_id: required(sub, orgs::ARG_USER)?,
        }),
        Some((other, _)) => bail!("unknown members command: {other}"),
        None => bail!("missing members command"),
    }
}
