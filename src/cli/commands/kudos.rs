use clap::{Arg, Command};

pub const CMD_GIVE: &str = "give";
pub const CMD_LIST: &str = "list";
pub const CMD_ANALYTICS: &str = "analytics";

pub const ARG_TO: &str = "to";
pub const ARG_MESSAGE: &str = "message";
pub const ARG_CATEGORY: &str = "category";
pub const ARG_PAGE: &str = "page";
pub const ARG_LIMIT: &str = "limit";
pub const ARG_RECIPIENT: &str = "recipient";
pub const ARG_TEAM: &str = "team";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_GIVE)
                .about("Give kudos to a teammate")
                .arg(
                    Arg::new(ARG_TO)
                        .long("to")
                        .help("Recipient user id")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_MESSAGE)
                        .short('m')
                        .long("message")
                        .help("Up to 500 characters")
                        .required(true),
                )
                .arg(Arg::new(ARG_CATEGORY).long("category")),
        )
        .subcommand(
            Command::new(CMD_LIST)
                .about("Show the kudos feed")
                .arg(
                    Arg::new(ARG_PAGE)
                        .long("page")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new(ARG_LIMIT)
                        .long("limit")
                        .value_parser(clap::value_parser!(u32).range(1..=100)),
                )
                .arg(
                    Arg::new(ARG_RECIPIENT)
                        .long("recipient")
                        .help("Only kudos received by this user id"),
                )
                .arg(
                    Arg::new(ARG_TEAM)
                        .long("team")
                        .help("Only kudos within this team id"),
                ),
        )
        .subcommand(Command::new(CMD_ANALYTICS).about("Kudos totals and top recipients"))
}
