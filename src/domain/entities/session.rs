use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque authentication state owned by the session store.
///
/// `creds` mirrors the client's `creds.json`; `keys` holds every other file of
/// the auth directory keyed by its file stem. Neither is interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionCredentials {
    #[serde(default)]
    pub creds: Map<String, Value>,
    #[serde(default)]
    pub keys: BTreeMap<String, Value>,
}

impl SessionCredentials {
    /// A session that has never been paired
    pub fn is_fresh(&self) -> bool {
        self.creds.is_empty()
    }

    /// Shallow-merge a partial credential update
    pub fn merge(&mut self, update: Map<String, Value>) {
        for (key, value) in update {
            self.creds.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overwrites_top_level_keys() {
        let mut session = SessionCredentials::default();
        assert!(session.is_fresh());

        session.merge(json!({"me": {"id": "1"}, "registered": false}).as_object().cloned().unwrap());
        session.merge(json!({"registered": true}).as_object().cloned().unwrap());

        assert!(!session.is_fresh());
        assert_eq!(session.creds["registered"], json!(true));
        assert_eq!(session.creds["me"], json!({"id": "1"}));
    }
}
