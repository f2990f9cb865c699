use serde::{Deserialize, Serialize};

/// Access tier of a principal. Serialized lowercase to match the persisted
/// record layout.
///
/// Self-registration always assigns `Manager`; `Staff` and `User` exist only
/// as bootstrap seed data in this version. That escalation mirrors the
/// original product behavior and is almost certainly a privilege bug there,
/// so it is preserved rather than corrected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Staff,
    User,
}

/// An authenticated identity as held in a session. Never carries a secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Store-side record: a principal plus its credential secret.
///
/// Secrets are plaintext for behavioral parity with the original product.
/// Unsuitable for any real deployment; a production redesign must hash
/// credentials and remove the shared bootstrap constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub credential_secret: String,
    pub role: Role,
}

impl CredentialRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Boolean permissions derived solely from a principal's role. These flags
/// are the single source of truth for gating protected views and mutations;
/// no caller may re-derive role logic independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub can_view_evidence: bool,
    pub can_add_evidence: bool,
    pub can_create_folder: bool,
    pub can_manage_users: bool,
}

impl Capabilities {
    /// All flags false. Anonymous callers get this, though protected views
    /// are expected to redirect before consulting any flag.
    pub fn none() -> Self { Self::default() }
}

/// Pure derivation of capability flags. `None` means anonymous.
pub fn capabilities_for(role: Option<Role>) -> Capabilities {
    match role {
        Some(Role::Manager) => Capabilities {
            can_view_evidence: true,
            can_add_evidence: true,
            can_create_folder: true,
            can_manage_users: true,
        },
        Some(Role::Staff) => Capabilities {
            can_view_evidence: true,
            can_add_evidence: true,
            can_create_folder: false,
            can_manage_users: false,
        },
        Some(Role::User) => Capabilities {
            can_view_evidence: true,
            can_add_evidence: false,
            can_create_folder: false,
            can_manage_users: false,
        },
        None => Capabilities::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table_per_role() {
        let m = capabilities_for(Some(Role::Manager));
        assert!(m.can_view_evidence && m.can_add_evidence && m.can_create_folder && m.can_manage_users);

        let s = capabilities_for(Some(Role::Staff));
        assert!(s.can_view_evidence, "staff can view");
        assert!(s.can_add_evidence, "staff can add");
        assert!(!s.can_create_folder, "staff cannot create folders");
        assert!(!s.can_manage_users, "staff cannot manage users");

        let u = capabilities_for(Some(Role::User));
        assert!(u.can_view_evidence, "user can view");
        assert!(!u.can_add_evidence && !u.can_create_folder && !u.can_manage_users);
    }

    #[test]
    fn anonymous_gets_nothing() {
        assert_eq!(capabilities_for(None), Capabilities::none());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let r: Role = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(r, Role::Staff);
    }

    #[test]
    fn record_to_principal_drops_secret() {
        let rec = CredentialRecord {
            id: "42".into(),
            email: "a@x.com".into(),
            name: "A".into(),
            credential_secret: "p1".into(),
            role: Role::Manager,
        };
        let p = rec.principal();
        assert_eq!(p.id, "42");
        assert_eq!(p.email, "a@x.com");
        // Principal has no secret field at all; serialize to prove it
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("credentialSecret").is_none());
    }
}
