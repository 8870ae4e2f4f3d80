use crate::{
    cli::globals::GlobalArgs,
    features::{
        auth::types::Role,
        users::{types::Member, MembersApi},
    },
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub enum MembersCommand {
    List {
        org_id: String,
    },
    Role {
        org_id: String,
        user_id: String,
        role: Role,
    },
    Remove {
        org_id: String,
        user_id: String,
    },
}

/// # Errors
/// Returns an error if no token is configured or the request fails.
pub async fn execute(command: MembersCommand, globals: &GlobalArgs) -> Result<()> {
    let api = MembersApi::new(globals.authenticated_client()?);
    match command {
        MembersCommand::List { org_id } => {
            let members = api
                .list_members(&org_id)
                .await
                .context("Failed to list members")?;
            for member in &members {
                println!("{}", member_line(member));
            }
        }
        MembersCommand::Role {
            org_id,
            user_id,
            role,
        } => {
            let member = api
                .update_role(&org_id, &user_id, role)
                .await
                .context("Failed to update role")?;
            println!("Updated {}", member_line(&member));
        }
        MembersCommand::Remove { org_id, user_id } => {
            api.remove_member(&org_id, &user_id)
                .await
                .context("Failed to remove member")?;
            println!("Removed {user_id} from {org_id}");
        }
    }
    Ok(())
}

fn member_line(member: &Member) -> String {
    format!(
        "{}  {} <{}>  {}",
        member.id,
        member.display_name(),
        member.email,
        member.role
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_line_format() {
        let member = Member {
            id: "u2".to_string(),
            email: "grace@example.com".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role: Role::Manager,
            kudos_received: None,
        };
        assert_eq!(
            member_line(&member),
            "u2  Grace Hopper <grace@example.com>  manager"
        );
    }
}
