use clap::{Arg, ArgAction, Command};

pub const CMD_SIGNUP: &str = "signup";
pub const CMD_LOGIN: &str = "login";
pub const CMD_SESSION: &str = "session";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_EMAIL: &str = "email";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_PRINT_TOKEN: &str = "print-token";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Email address the code is sent to")
        .required(true)
}

fn print_token_arg() -> Arg {
    Arg::new(ARG_PRINT_TOKEN)
        .long("print-token")
        .help("Print the bearer token after signing in")
        .action(ArgAction::SetTrue)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_SIGNUP)
                .about("Create an account and sign in with the emailed code")
                .arg(email_arg())
                .arg(
                    Arg::new(ARG_FIRST_NAME)
                        .long("first-name")
                        .required(true),
                )
                .arg(Arg::new(ARG_LAST_NAME).long("last-name").required(true))
                .arg(print_token_arg()),
        )
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in with a code sent to your email")
                .arg(email_arg())
                .arg(print_token_arg()),
        )
        .subcommand(Command::new(CMD_SESSION).about("Restore and show the current session"))
        .subcommand(Command::new(CMD_LOGOUT).about("End the current session"))
}
