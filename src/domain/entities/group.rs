use serde::{Deserialize, Serialize};

/// Elevated role of a group participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Superadmin,
}

/// A member of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(default)]
    pub admin: Option<AdminRole>,
}

impl Participant {
    pub fn member(id: impl Into<String>) -> Self {
        Self { id: id.into(), admin: None }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self { id: id.into(), admin: Some(AdminRole::Admin) }
    }

    pub fn is_admin(&self) -> bool {
        self.admin.is_some()
    }
}

/// Live snapshot of a group, fetched per command and never cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl GroupMetadata {
    pub fn is_admin(&self, jid: &str) -> bool {
        self.participants.iter().any(|p| p.id == jid && p.is_admin())
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }
}

/// Membership mutation requested of, or reported by, the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantAction {
    Add,
    Remove,
    Promote,
    Demote,
}

impl ParticipantAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantAction::Add => "add",
            ParticipantAction::Remove => "remove",
            ParticipantAction::Promote => "promote",
            ParticipantAction::Demote => "demote",
        }
    }
}
