//! Client helpers for organization member endpoints. Paths are built here so
//! ids are validated and trimmed in one place.

use crate::{
    app_lib::{AppError, HttpClient, Payload, RequestOptions},
    features::{
        auth::types::Role,
        users::types::{Member, UpdateRoleRequest},
    },
};
use reqwest::Method;

#[derive(Clone, Debug)]
pub struct MembersApi {
    http: HttpClient,
}

impl MembersApi {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// # Errors
    /// Returns `AppError::Validation` for a blank id, otherwise request errors.
    pub async fn list_members(&self, org_id: &str) -> Result<Vec<Member>, AppError> {
        let path = members_path(org_id)?;
        let payload: Payload<Vec<Member>> = self.http.get_json(&path, RequestOptions::new()).await?;
        Ok(payload.into_inner())
    }

    /// Changes a member's role. `Role::Unknown` is refused locally.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for blank ids or an unknown role.
    pub async fn update_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<Member, AppError> {
        if role == Role::Unknown {
            return Err(AppError::Validation(
                "Role must be admin, manager, or member.".to_string(),
            ));
        }

        let path = member_path(org_id, user_id)?;
        let payload: Payload<Member> = self
            .http
            .send_json(
                Method::PATCH,
                &path,
                &UpdateRoleRequest { role },
                RequestOptions::new(),
            )
            .await?;
        Ok(payload.into_inner())
    }

    /// # Errors
    /// Returns `AppError::Validation` for blank ids, otherwise request errors.
    pub async fn remove_member(&self, org_id: &str, user_id: &str) -> Result<(), AppError> {
        let path = member_path(org_id, user_id)?;
        self.http.delete(&path, RequestOptions::new()).await?;
        Ok(())
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{what} is required.")));
    }
    Ok(trimmed)
}

fn members_path(org_id: &str) -> Result<String, AppError> {
    let org_id = required(org_id, "Organization id")?;
    Ok(format!("/organizations/{org_id}/members"))
}

fn member_path(org_id: &str, user_id: &str) -> Result<String, AppError> {
    let base = members_path(org_id)?;
    let user_id = required(user_id, "User id")?;
    Ok(format!("{base}/{user_id}"))
}
