//! Lead model: a prospective customer moving through the sales funnel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "lead_status")]
pub enum LeadStatus {
    New,
    Contacted,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "lead_priority")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLead {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    pub company: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub priority: Option<LeadPriority>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateLead {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    pub company: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub priority: Option<LeadPriority>,
}

/// Summary DTO for list views and the dashboard "latest leads" feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub priority: LeadPriority,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_status_round_trip() {
        let status = LeadStatus::Contacted;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"Contacted\"");
        let back: LeadStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LeadStatus::Contacted);
    }

    #[test]
    fn create_lead_requires_valid_email() {
        let lead = CreateLead {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: None,
            email: "not-an-email".to_string(),
            phone: None,
            website: None,
            description: None,
            priority: None,
        };
        assert!(lead.validate().is_err());
    }

    #[test]
    fn create_lead_accepts_minimal_input() {
        let lead = CreateLead {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: Some("Analytical Engines Ltd".to_string()),
            email: "ada@example.com".to_string(),
            phone: None,
            website: None,
            description: None,
            priority: Some(LeadPriority::High),
        };
        assert!(lead.validate().is_ok());
    }
}
