use crate::cli::{
    actions::{auth, kudos, members, orgs, Action},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Signup(args) => auth::signup(args, globals).await,
        Action::Login(args) => auth::login(args, globals).await,
        Action::Session => auth::session(globals).await,
        Action::Logout => auth::logout(globals).await,
        Action::Orgs(command) => orgs::execute(command, globals).await,
        Action::Members(command) => members::execute(command, globals).await,
        Action::Give(request) => kudos::give(&request, globals).await,
        Action::List(filter) => kudos::list(&filter, globals).await,
        Action::Analytics => kudos::analytics(globals).await,
    }
}
