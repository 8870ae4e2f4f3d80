use crate::{
    cli::globals::GlobalArgs,
    features::orgs::{
        types::{CreateOrgRequest, Organization},
        OrgsApi,
    },
};
use anyhow::{Context, Result};
use std::fmt::Write as _;

#[derive(Debug)]
pub enum OrgsCommand {
    List,
    Create(CreateOrgRequest),
    Join { invite_code: String },
}

/// # Errors
/// Returns an error if no token is configured or the request fails.
pub async fn execute(command: OrgsCommand, globals: &GlobalArgs) -> Result<()> {
    let api = OrgsApi::new(globals.authenticated_client()?);
    match command {
        OrgsCommand::List => {
            let orgs = api
                .list_orgs()
                .await
                .context("Failed to list organizations")?;
            if orgs.is_empty() {
                println!("You are not a member of any organization yet.");
            }
            for org in &orgs {
                println!("{}", org_line(org));
            }
        }
        OrgsCommand::Create(request) => {
            let org = api
                .create_org(&request)
                .await
                .context("Failed to create organization")?;
            println!("Created {}", org_line(&org));
        }
        OrgsCommand::Join { invite_code } => {
            let org = api
                .join_org(&invite_code)
                .await
                .context("Failed to join organization")?;
            println!("Joined {}", org_line(&org));
        }
    }
    Ok(())
}

fn org_line(org: &Organization) -> String {
    let mut line = format!("{}  {}", org.id, org.name);
    if let Some(count) = org.member_count {
        let _ = write!(line, "  ({count} members)");
    }
    if let Some(code) = &org.invite_code {
        let _ = write!(line, "  invite: {code}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_line_includes_optional_details() {
        let mut org = Organization {
            id: "o1".to_string(),
            name: "Acme".to_string(),
            description: None,
            invite_code: None,
            member_count: None,
        };
        assert_eq!(org_line(&org), "o1  Acme");

        org.member_count = Some(3);
        org.invite_code = Some("JOIN42".to_string());
        assert_eq!(org_line(&org), "o1  Acme  (3 members)  invite: JOIN42");
    }
}
