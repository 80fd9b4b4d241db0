//! Company info model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company information singleton (always row id 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub id: i64,
    /// Company display name
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Social profile links keyed by platform name
    pub social_links: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating company info; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanyInput {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub social_links: Option<serde_json::Value>,
}

impl UpdateCompanyInput {
    /// Apply this input on top of an existing row
    pub fn apply(self, mut info: CompanyInfo) -> CompanyInfo {
        if let Some(name) = self.name {
            info.name = name;
        }
        if let Some(tagline) = self.tagline {
            info.tagline = tagline;
        }
        if let Some(description) = self.description {
            info.description = description;
        }
        if let Some(email) = self.email {
            info.email = email;
        }
        if let Some(phone) = self.phone {
            info.phone = phone;
        }
        if let Some(address) = self.address {
            info.address = address;
        }
        if let Some(social_links) = self.social_links {
            info.social_links = social_links;
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompanyInfo {
        CompanyInfo {
            id: 1,
            name: "Kursa Training".to_string(),
            tagline: "Learn by doing".to_string(),
            description: String::new(),
            email: "hello@kursa.example".to_string(),
            phone: String::new(),
            address: String::new(),
            social_links: serde_json::json!({}),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_partial_update() {
        let input = UpdateCompanyInput {
            phone: Some("+1 555 0100".to_string()),
            ..Default::default()
        };

        let updated = input.apply(sample());

        assert_eq!(updated.phone, "+1 555 0100");
        // Untouched fields survive
        assert_eq!(updated.name, "Kursa Training");
        assert_eq!(updated.tagline, "Learn by doing");
    }

    #[test]
    fn test_apply_social_links_replaced_wholesale() {
        let input = UpdateCompanyInput {
            social_links: Some(serde_json::json!({"linkedin": "https://linkedin.com/company/kursa"})),
            ..Default::default()
        };

        let updated = input.apply(sample());
        assert_eq!(
            updated.social_links["linkedin"],
            "https://linkedin.com/company/kursa"
        );
    }
}
