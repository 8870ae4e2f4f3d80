pub mod auth;
pub mod kudos;
pub mod members;
pub mod orgs;

// Single dispatch point for `Action`; kept apart so this file stays a list
// of variants.
mod run;

use crate::{
    cli::globals::GlobalArgs,
    features::kudos::types::{GiveKudosRequest, KudosFilter},
};

#[derive(Debug)]
pub enum Action {
    Signup(auth::SignupArgs),
    Login(auth::LoginArgs),
    Session,
    Logout,
    Orgs(orgs::OrgsCommand),
    Members(members::MembersCommand),
    Give(GiveKudosRequest),
    List(KudosFilter),
    Analytics,
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
