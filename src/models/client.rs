//! Client model: a customer, possibly converted from a lead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub converted_from_lead: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClient {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    pub company: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateClient {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    pub company: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/// Summary DTO for list views and the dashboard "latest clients" feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub converted_from_lead: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_client_requires_valid_email() {
        let client = CreateClient {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            company: None,
            email: "nope".to_string(),
            phone: None,
            address: None,
            city: None,
            zipcode: None,
            country: None,
            website: None,
            description: None,
        };
        assert!(client.validate().is_err());
    }

    #[test]
    fn client_summary_serializes_conversion_link() {
        let lead_id = Uuid::new_v4();
        let summary = ClientSummary {
            id: Uuid::new_v4(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            company: Some("Navy".to_string()),
            converted_from_lead: Some(lead_id),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["converted_from_lead"], lead_id.to_string());
    }
}
