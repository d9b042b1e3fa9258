//! JSON shapes served by the portal's API views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type CategoryId = u64;
pub type OpportunityId = u64;

/// Category as listed by `GET /api/categories/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub opportunity_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

/// A single preview row. `category` is the category name, not its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunitySummary {
    pub id: OpportunityId,
    pub title: String,
    pub category: String,
    pub date: NaiveDate,
    pub volunteer_count: u64,
}

/// Response of `GET /api/export/preview/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPage {
    pub opportunities: Vec<OpportunitySummary>,
    pub total_count: u64,
    pub total_volunteers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Full opportunity card as served by `GET /api/opportunities/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: CategoryRef,
    pub volunteer_count: u64,
}

impl Opportunity {
    /// Label used by the server-rendered select widgets (`"<title> - <date>"`).
    pub fn option_label(&self) -> String {
        format!("{} - {}", self.title, self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityList {
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub opportunity_count: u64,
    pub volunteer_count: u64,
}

/// Response of `GET /api/dashboard-stats/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_opportunities: u64,
    pub upcoming_opportunities: u64,
    pub total_volunteers: u64,
    #[serde(default)]
    pub categories: Vec<CategoryStats>,
}

/// Outcome of posting one of the server-rendered forms.
///
/// Django answers a valid submission with a redirect and re-renders the form
/// (status 200) when its own validation rejects the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormReceipt {
    Accepted { location: Option<String> },
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_preview_page() {
        let body = r#"{
            "opportunities": [
                {"id": 4, "title": "Beach Cleanup", "category": "Environment",
                 "date": "2024-06-01", "volunteer_count": 12}
            ],
            "total_count": 1,
            "total_volunteers": 12
        }"#;
        let page: PreviewPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(
            page.opportunities[0].date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn decodes_opportunity_with_nested_category() {
        let body = r#"{"opportunities": [{
            "id": 1, "title": "Food Bank", "description": "Sort donations",
            "date": "2024-07-15",
            "category": {"id": 2, "name": "Community", "slug": "community"},
            "volunteer_count": 3
        }]}"#;
        let list: OpportunityList = serde_json::from_str(body).unwrap();
        let opp = &list.opportunities[0];
        assert_eq!(opp.category.slug, "community");
        assert_eq!(opp.option_label(), "Food Bank - 2024-07-15");
    }

    #[test]
    fn dashboard_stats_tolerates_missing_categories() {
        let body = r#"{"total_opportunities": 3, "upcoming_opportunities": 2, "total_volunteers": 9}"#;
        let stats: DashboardStats = serde_json::from_str(body).unwrap();
        assert!(stats.categories.is_empty());
        assert_eq!(stats.total_volunteers, 9);
    }
}
