use crate::{
    cli::globals::GlobalArgs,
    features::kudos::{
        types::{GiveKudosRequest, Kudos, KudosAnalytics, KudosFilter, KudosPage},
        KudosApi,
    },
};
use anyhow::{Context, Result};
use std::fmt::Write as _;

/// # Errors
/// Returns an error if no token is configured or the request fails.
pub async fn give(request: &GiveKudosRequest, globals: &GlobalArgs) -> Result<()> {
    let api = KudosApi::new(globals.authenticated_client()?);
    let kudos = api
        .give_kudos(request)
        .await
        .context("Failed to give kudos")?;
    println!("Sent kudos {}", kudos.id);
    Ok(())
}

/// # Errors
/// Returns an error if no token is configured or the request fails.
pub async fn list(filter: &KudosFilter, globals: &GlobalArgs) -> Result<()> {
    let api = KudosApi::new(globals.authenticated_client()?);
    let page = api
        .list_kudos(filter)
        .await
        .context("Failed to load kudos")?;
    print!("{}", render_page(&page));
    Ok(())
}

/// # Errors
/// Returns an error if no token is configured or the request fails.
pub async fn analytics(globals: &GlobalArgs) -> Result<()> {
    let api = KudosApi::new(globals.authenticated_client()?);
    let analytics = api
        .analytics()
        .await
        .context("Failed to load analytics")?;
    print!("{}", render_analytics(&analytics));
    Ok(())
}

fn party(name: Option<&String>, id: &str) -> String {
    name.map_or_else(|| id.to_string(), Clone::clone)
}

fn kudos_line(kudos: &Kudos) -> String {
    let mut line = format!(
        "{}  {} -> {}: {}",
        kudos.created_at.format("%Y-%m-%d"),
        party(kudos.sender_name.as_ref(), &kudos.sender_id),
        party(kudos.recipient_name.as_ref(), &kudos.recipient_id),
        kudos.message
    );
    if let Some(category) = &kudos.category {
        let _ = write!(line, " [{category}]");
    }
    line
}

fn render_page(page: &KudosPage) -> String {
    if page.items.is_empty() {
        return "No kudos yet.\n".to_string();
    }

    let mut out = String::new();
    for kudos in &page.items {
        let _ = writeln!(out, "{}", kudos_line(kudos));
    }
    if page.total > 0 {
        let _ = writeln!(
            out,
            "-- page {} ({} of {} total)",
            page.page.max(1),
            page.items.len(),
            page.total
        );
    }
    out
}

fn render_analytics(analytics: &KudosAnalytics) -> String {
    let mut out = format!(
        "Total kudos: {}\nThis month: {}\n",
        analytics.total_kudos, analytics.this_month
    );
    if !analytics.top_recipients.is_empty() {
        out.push_str("Top recipients:\n");
        for (rank, recipient) in analytics.top_recipients.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({})",
                rank + 1,
                party(recipient.name.as_ref(), &recipient.user_id),
                recipient.count
            );
        }
    }
    if !analytics.by_category.is_empty() {
        out.push_str("By category:\n");
        for entry in &analytics.by_category {
            let _ = writeln!(out, "  {}: {}", entry.category, entry.count);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::kudos::types::{CategoryCount, RecipientCount};
    use chrono::{TimeZone, Utc};

    fn kudos() -> Kudos {
        Kudos {
            id: "k1".to_string(),
            sender_id: "u1".to_string(),
            recipient_id: "u2".to_string(),
            sender_name: Some("Ada Lovelace".to_string()),
            recipient_name: None,
            message: "Great demo".to_string(),
            category: Some("teamwork".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn kudos_line_falls_back_to_ids() {
        assert_eq!(
            kudos_line(&kudos()),
            "2024-03-01  Ada Lovelace -> u2: Great demo [teamwork]"
        );
    }

    #[test]
    fn empty_page() {
        assert_eq!(render_page(&KudosPage::default()), "No kudos yet.\n");
    }

    #[test]
    fn page_footer_shows_totals() {
        let page = KudosPage {
            items: vec![kudos()],
            total: 7,
            page: 2,
            limit: 1,
        };
        assert!(render_page(&page).ends_with("-- page 2 (1 of 7 total)\n"));
    }

    #[test]
    fn analytics_sections() {
        let analytics = KudosAnalytics {
            total_kudos: 12,
            this_month: 4,
            top_recipients: vec![RecipientCount {
                user_id: "u2".to_string(),
                name: Some("Grace Hopper".to_string()),
                count: 5,
            }],
            by_category: vec![CategoryCount {
                category: "teamwork".to_string(),
                count: 8,
            }],
        };
        assert_eq!(
            render_analytics(&analytics),
            "Total kudos: 12\nThis month: 4\nTop recipients:\n  1. Grace Hopper (5)\nBy category:\n  teamwork: 8\n"
        );
    }
}
