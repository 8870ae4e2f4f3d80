//! Request and response types for the kudos endpoints.

use crate::app_lib::RequestOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kudos {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of the kudos feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KudosPage {
    #[serde(alias = "kudos")]
    pub items: Vec<Kudos>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

/// Feed filters; unset fields are left out of the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KudosFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipient_id: Option<String>,
    pub team_id: Option<String>,
}

impl KudosFilter {
    pub(crate) fn apply(&self, mut options: RequestOptions) -> RequestOptions {
        if let Some(page) = self.page {
            options = options.param("page", page);
        }
        if let Some(limit) = self.limit {
            options = options.param("limit", limit);
        }
        for (name, value) in [
            ("recipientId", &self.recipient_id),
            ("teamId", &self.team_id),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                options = options.param(name, value);
            }
        }
        options
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveKudosRequest {
    pub recipient_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KudosAnalytics {
    #[serde(default)]
    pub total_kudos: u64,
    #[serde(default)]
    pub this_month: u64,
    #[serde(default)]
    pub top_recipients: Vec<RecipientCount>,
    #[serde(default)]
    pub by_category: Vec<CategoryCount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientCount {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_skips_unset_and_blank_fields() {
        let filter = KudosFilter {
            page: Some(2),
            limit: None,
            recipient_id: Some(" u2 ".to_string()),
            team_id: Some(String::new()),
        };
        let options = filter.apply(RequestOptions::new());
        assert_eq!(
            options.params,
            vec![
                ("page".to_string(), "2".to_string()),
                ("recipientId".to_string(), "u2".to_string()),
            ]
        );
    }

    #[test]
    fn page_accepts_kudos_alias() {
        let page: KudosPage = serde_json::from_value(json!({
            "kudos": [{
                "id": "k1",
                "senderId": "u1",
                "recipientId": "u2",
                "message": "Great demo",
                "createdAt": "2024-03-01T12:00:00Z"
            }],
            "total": 1
        }))
        .unwrap();
        assert_eq!(page.items[0].category, None);
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 0);
    }
}
