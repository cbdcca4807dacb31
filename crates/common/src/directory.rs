//! Party directory
//!
//! The engine does not own user registration; it only needs to resolve a
//! user id into the trading identity behind it: company name, the short
//! company code used in contract numbers, and the registered city. The
//! directory is populated at startup (or by the surrounding platform) and
//! injected into the services that need counterparty lookups.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A registered trading party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Platform user behind this party
    pub user_id: UserId,
    /// Registered company name
    pub company_name: String,
    /// Short uppercase code used in contract numbers
    pub company_code: String,
    /// Registered city
    pub city: String,
}

impl Party {
    /// Create a party, deriving the company code from the name
    pub fn new(
        user_id: UserId,
        company_name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        let company_name = company_name.into();
        let company_code = derive_company_code(&company_name);
        Self {
            user_id,
            company_name,
            company_code,
            city: city.into(),
        }
    }

    /// Create a party with an explicit company code
    pub fn with_code(
        user_id: UserId,
        company_name: impl Into<String>,
        company_code: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            company_name: company_name.into(),
            company_code: company_code.into().to_uppercase(),
            city: city.into(),
        }
    }
}

/// Derive a short company code: the first three alphanumeric characters
/// of the name, uppercased. Falls back to "XXX" for degenerate names.
pub fn derive_company_code(company_name: &str) -> String {
    let code: String = company_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    if code.is_empty() {
        "XXX".to_string()
    } else {
        code
    }
}

/// Lookup interface for registered parties
///
/// Implementations must be cheap to call from request handlers; the
/// in-memory implementation below is the default, and the surrounding
/// platform may supply its own backed by its user store.
pub trait PartyDirectory: Send + Sync {
    /// Resolve a user id into its registered party, if any
    fn get(&self, user_id: UserId) -> Option<Party>;

    /// Whether a user id is registered
    fn exists(&self, user_id: UserId) -> bool {
        self.get(user_id).is_some()
    }
}

/// In-memory party directory
#[derive(Debug, Default)]
pub struct InMemoryPartyDirectory {
    parties: RwLock<HashMap<UserId, Party>>,
}

impl InMemoryPartyDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a party
    pub fn register(&self, party: Party) {
        let mut parties = self.parties.write().unwrap();
        parties.insert(party.user_id, party);
    }

    /// Number of registered parties
    pub fn len(&self) -> usize {
        self.parties.read().unwrap().len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartyDirectory for InMemoryPartyDirectory {
    fn get(&self, user_id: UserId) -> Option<Party> {
        self.parties.read().unwrap().get(&user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_company_code() {
        assert_eq!(derive_company_code("EcoPlast Industries"), "ECO");
        assert_eq!(derive_company_code("3M Recycling"), "3MR");
        assert_eq!(derive_company_code("  --  "), "XXX");
    }

    #[test]
    fn test_register_and_get() {
        let dir = InMemoryPartyDirectory::new();
        let uid = UserId::new();
        dir.register(Party::new(uid, "EcoPlast Industries", "Mumbai"));

        let party = dir.get(uid).unwrap();
        assert_eq!(party.company_name, "EcoPlast Industries");
        assert_eq!(party.company_code, "ECO");
        assert!(dir.exists(uid));
        assert!(!dir.exists(UserId::new()));
    }

    #[test]
    fn test_explicit_code_uppercased() {
        let dir = InMemoryPartyDirectory::new();
        let uid = UserId::new();
        dir.register(Party::with_code(uid, "Green Steel", "gst", "Pune"));
        assert_eq!(dir.get(uid).unwrap().company_code, "GST");
    }

    #[test]
    fn test_register_replaces() {
        let dir = InMemoryPartyDirectory::new();
        let uid = UserId::new();
        dir.register(Party::new(uid, "First Name", "Delhi"));
        dir.register(Party::new(uid, "Second Name", "Delhi"));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get(uid).unwrap().company_name, "Second Name");
    }
}
