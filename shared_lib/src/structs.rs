use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils;

/// Inbound donation event, `{ data: { donation: { email, firstName, lastName } } }`
#[derive(Debug, Clone, Default)]
pub struct DonationWebhook {
    pub donation: Option<Donation>,
}

#[derive(Debug, Clone, Default)]
pub struct Donation {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl DonationWebhook {
    /// Reads each donation field on its own so a badly typed name never hides
    /// the email. `data.donation` must be an object, the email a string; names
    /// given as numbers are kept as text and anything else counts as unset.
    pub fn from_value(value: &Value) -> Self {
        let donation = value
            .pointer("/data/donation")
            .filter(|donation| donation.is_object())
            .map(|donation| Donation {
                email: donation
                    .get("email")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                first_name: text_field(donation.get("firstName")),
                last_name: text_field(donation.get("lastName")),
            });

        DonationWebhook { donation }
    }

    pub fn donation(&self) -> Option<&Donation> {
        self.donation.as_ref()
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Donor fields after sanitizing, ready to be sent to the contact list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donor {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Donation {
    /// Returns `None` when there is no usable email. Names default to empty.
    pub fn normalize(&self) -> Option<Donor> {
        let email = utils::sanitize_email(self.email.as_deref().unwrap_or_default());
        if email.is_empty() {
            return None;
        }

        if !utils::is_valid_email(&email) {
            tracing::warn!("Donor email {} does not look like a valid address", email);
        }

        Some(Donor {
            email,
            first_name: utils::sanitize_text_field(self.first_name.as_deref().unwrap_or_default()),
            last_name: utils::sanitize_text_field(self.last_name.as_deref().unwrap_or_default()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub list_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            list_id: list_id.into(),
        }
    }

    /// The configured list id as the integer the contact API expects. A list id
    /// that doesn't coerce to a positive integer counts as unset.
    pub fn list_id_number(&self) -> Option<i64> {
        utils::coerce_to_int(&self.list_id).filter(|id| *id > 0)
    }

    /// Both values present, api key non-empty and the list id usable
    pub fn usable(&self) -> Option<(&str, i64)> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return None;
        }
        Some((api_key, self.list_id_number()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_donation() {
        let webhook = DonationWebhook::from_value(&json!({
            "data": {"donation": {"email": "a@x.com", "firstName": "A", "lastName": "B"}}
        }));
        let donor = webhook.donation().and_then(Donation::normalize).unwrap();
        assert_eq!(
            donor,
            Donor {
                email: "a@x.com".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
            }
        );
    }

    #[test]
    fn missing_names_default_to_empty() {
        let webhook = DonationWebhook::from_value(&json!({"data": {"donation": {"email": " a@x.com "}}}));
        let donor = webhook.donation().and_then(Donation::normalize).unwrap();
        assert_eq!(donor.email, "a@x.com");
        assert_eq!(donor.first_name, "");
        assert_eq!(donor.last_name, "");
    }

    #[test]
    fn missing_or_empty_email_has_no_donor() {
        for payload in [
            json!({}),
            json!({"data": {}}),
            json!({"data": {"donation": {}}}),
            json!({"data": {"donation": {"email": ""}}}),
            json!({"data": {"donation": {"email": "   "}}}),
            json!({"data": {"donation": {"email": 42}}}),
            json!("not an object"),
        ] {
            let webhook = DonationWebhook::from_value(&payload);
            assert!(
                webhook.donation().and_then(Donation::normalize).is_none(),
                "{payload}"
            );
        }
    }

    #[test]
    fn badly_typed_names_keep_the_donor() {
        let webhook = DonationWebhook::from_value(&json!({
            "data": {"donation": {"email": "a@x.com", "firstName": 42, "lastName": {"x": 1}}}
        }));
        let donor = webhook.donation().and_then(Donation::normalize).unwrap();
        assert_eq!(donor.email, "a@x.com");
        assert_eq!(donor.first_name, "42");
        assert_eq!(donor.last_name, "");
    }

    #[test]
    fn malformed_email_is_passed_through() {
        let webhook = DonationWebhook::from_value(&json!({"data": {"donation": {"email": "nope"}}}));
        let donor = webhook.donation().and_then(Donation::normalize).unwrap();
        assert_eq!(donor.email, "nope");
    }

    #[test]
    fn credentials_usable() {
        assert_eq!(Credentials::new("key", "12").usable(), Some(("key", 12)));
        assert_eq!(Credentials::new("key", "12abc").usable(), Some(("key", 12)));
        assert_eq!(Credentials::new("", "12").usable(), None);
        assert_eq!(Credentials::new("key", "").usable(), None);
        assert_eq!(Credentials::new("key", "abc").usable(), None);
        assert_eq!(Credentials::new("key", "0").usable(), None);
        assert_eq!(Credentials::default().usable(), None);
    }
}
