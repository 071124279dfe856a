// common/src/models/user.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifiers of one account (email, phone, wallet or social login).
///
/// Only the commonly read fields are typed; everything else is kept in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of a user's linked account list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAccount {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub details: AccountDetails,
}

/// User object as handed out by the Privy client SDK.
///
/// The object is held exactly as received and serialized back verbatim,
/// nulls and absent keys included. The accessors below are read-only views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivyUser {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for PrivyUser {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl PrivyUser {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    /// Entries of `linkedAccounts` that carry a `type`
    pub fn linked_accounts(&self) -> Vec<LinkedAccount> {
        self.fields
            .get("linkedAccounts")
            .and_then(Value::as_array)
            .map(|accounts| {
                accounts
                    .iter()
                    .filter_map(|account| serde_json::from_value(account.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed view of a top-level account such as `email` or `google`
    pub fn account(&self, name: &str) -> Option<AccountDetails> {
        self.fields
            .get(name)
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// An account may only be unlinked while another one remains
    pub fn can_unlink_account(&self) -> bool {
        self.linked_accounts().len() > 1
    }

    /// Subjects of the linked social logins, keyed by provider
    pub fn social_subjects(&self) -> Vec<(&'static str, String)> {
        ["google", "twitter", "discord"]
            .into_iter()
            .filter_map(|provider| {
                self.account(provider)
                    .and_then(|details| details.subject)
                    .map(|subject| (provider, subject))
            })
            .collect()
    }
}
