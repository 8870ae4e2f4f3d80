//! Client wrappers for organization endpoints.

use crate::{
    app_lib::{AppError, HttpClient, Payload, RequestOptions},
    features::orgs::types::{CreateOrgRequest, JoinOrgRequest, Organization},
};
use reqwest::Method;

pub const ORGS_PATH: &str = "/organizations";
pub const JOIN_PATH: &str = "/organizations/join";

#[derive(Clone, Debug)]
pub struct OrgsApi {
    http: HttpClient,
}

impl OrgsApi {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetches the organizations the current user belongs to.
    ///
    /// # Errors
    /// Returns `AppError::Http` on request failure.
    pub async fn list_orgs(&self) -> Result<Vec<Organization>, AppError> {
        let payload: Payload<Vec<Organization>> =
            self.http.get_json(ORGS_PATH, RequestOptions::new()).await?;
        Ok(payload.into_inner())
    }

    /// Creates an organization; the caller becomes its admin.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for a blank name.
    pub async fn create_org(&self, request: &CreateOrgRequest) -> Result<Organization, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Organization name is required.".to_string(),
            ));
        }

        let request = CreateOrgRequest {
            name: name.to_string(),
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_string),
        };
        let payload: Payload<Organization> = self
            .http
            .send_json(Method::POST, ORGS_PATH, &request, RequestOptions::new())
            .await?;
        Ok(payload.into_inner())
    }

    /// Joins an organization with an invite code.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for a blank code.
    pub async fn join_org(&self, invite_code: &str) -> Result<Organization, AppError> {
        let invite_code = invite_code.trim();
        if invite_code.is_empty() {
            return Err(AppError::Validation("Invite code is required.".to_string()));
        }

        let request = JoinOrgRequest {
            invite_code: invite_code.to_string(),
        };
        let payload: Payload<Organization> = self
            .http
            .send_json(Method::POST, JOIN_PATH, &request, RequestOptions::new())
            .await?;
        Ok(payload.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app_lib::AppConfig;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn api_for(server: &MockServer) -> OrgsApi {
        let config = AppConfig::default().with_base_url(&server.uri());
        OrgsApi::new(HttpClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn lists_wrapped_organizations() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ORGS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"id": "o1", "name": "Acme", "memberCount": 4}]
            })))
            .mount(&server)
            .await;

        let orgs = api_for(&server).list_orgs().await?;
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "Acme");
        assert_eq!(orgs[0].member_count, Some(4));
        Ok(())
    }

    #[tokio::test]
    async fn create_trims_and_drops_blank_description() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ORGS_PATH))
            .and(body_json(json!({"name": "Acme"})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "o1", "name": "Acme"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let org = api_for(&server)
            .create_org(&CreateOrgRequest {
                name: "  Acme ".to_string(),
                description: Some("  ".to_string()),
            })
            .await?;
        assert_eq!(org.id, "o1");
        Ok(())
    }

    #[tokio::test]
    async fn blank_inputs_never_reach_the_server() {
        let http = HttpClient::new(&AppConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        let api = OrgsApi::new(http);

        let err = api
            .create_org(&CreateOrgRequest {
                name: " ".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(matches!(
            api.join_org("").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn join_reports_server_error() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(JOIN_PATH))
            .and(body_json(json!({"inviteCode": "ABC123"})))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Invalid invite code"})),
            )
            .mount(&server)
            .await;

        let err = api_for(&server).join_org("ABC123").await.unwrap_err();
        let AppError::Http(http) = err else {
            panic!("expected http error, got {err:?}");
        };
        assert!(http.is_not_found());
        assert_eq!(http.server_message(), Some("Invalid invite code"));
        Ok(())
    }
}
