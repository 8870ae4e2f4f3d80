use clap::{Arg, Command};

pub const CMD_ORGS: &str = "orgs";
pub const CMD_MEMBERS: &str = "members";

pub const CMD_LIST: &str = "list";
pub const CMD_CREATE: &str = "create";
pub const CMD_JOIN: &str = "join";
pub const CMD_ROLE: &str = "role";
pub const CMD_REMOVE: &str = "remove";

pub const ARG_NAME: &str = "name";
pub const ARG_DESCRIPTION: &str = "description";
pub const ARG_CODE: &str = "code";
pub const ARG_ORG: &str = "org";
pub const ARG_USER: &str = "user";
pub const ARG_ROLE: &str = "role";

fn org_arg() -> Arg {
    Arg::new(ARG_ORG)
        .long("org")
        .help("Organization id")
        .required(true)
}

fn user_arg() -> Arg {
    Arg::new(ARG_USER)
        .long("user")
        .help("User id")
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_ORGS)
                .about("Organizations you belong to")
                .subcommand_required(true)
                .subcommand(Command::new(CMD_LIST).about("List your organizations"))
                .subcommand(
                    Command::new(CMD_CREATE)
                        .about("Create an organization")
                        .arg(Arg::new(ARG_NAME).long("name").required(true))
                        .arg(Arg::new(ARG_DESCRIPTION).long("description")),
                )
                .subcommand(
                    Command::new(CMD_JOIN)
                        .about("Join an organization with an invite code")
                        .arg(Arg::new(ARG_CODE).long("code").required(true)),
                ),
        )
        .subcommand(
            Command::new(CMD_MEMBERS)
                .about("Team members and roles")
                .subcommand_required(true)
                .subcommand(
                    Command::new(CMD_LIST)
                        .about("List members of an organization")
                        .arg(org_arg()),
                )
                .subcommand(
                    Command::new(CMD_ROLE)
                        .about("Change a member's role")
                        .arg(org_arg())
                        .arg(user_arg())
                        .arg(
                            Arg::new(ARG_ROLE)
                                .long("role")
                                .required(true)
                                .value_parser(["admin", "manager", "member"]),
                        ),
                )
                .subcommand(
                    Command::new(CMD_REMOVE)
                        .about("Remove a member from an organization")
                        .arg(org_arg())
                        .arg(user_arg()),
                ),
        )
}
