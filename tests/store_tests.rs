//! Credential store integration tests: uniqueness, registration collisions
//! and remembered-session round-trips against a real on-disk root.

use anyhow::Result;
use tempfile::tempdir;

use casevault::error::AppError;
use casevault::identity::{Principal, Role};
use casevault::store::{CredentialStore, BOOTSTRAP_SECRET};

#[test]
fn find_by_email_returns_exactly_one_match() -> Result<()> {
    let tmp = tempdir()?;
    let store = CredentialStore::new(tmp.path())?;

    store.register("A", "a@x.com", "p1").expect("register a@x.com");
    let rec = store.find_by_email("a@x.com").expect("registered email resolves");
    assert_eq!(rec.email, "a@x.com");
    assert_eq!(rec.credential_secret, "p1");

    // Bootstrap lookups resolve too, with the shared constant secret
    let boot = store.find_by_email("manager@example.com").expect("bootstrap resolves");
    assert_eq!(boot.role, Role::Manager);
    assert_eq!(boot.credential_secret, BOOTSTRAP_SECRET);
    Ok(())
}

#[test]
fn second_register_with_same_email_conflicts() -> Result<()> {
    let tmp = tempdir()?;
    let store = CredentialStore::new(tmp.path())?;

    store.register("A", "a@x.com", "p1").expect("first register");
    let dup = store.register("Other", "a@x.com", "p2");
    assert!(matches!(dup, Err(AppError::Conflict { .. })), "duplicate email must conflict");
    assert_eq!(store.registered().len(), 1, "failed register must not append");
    Ok(())
}

#[test]
fn registered_collection_survives_reopen() -> Result<()> {
    let tmp = tempdir()?;
    {
        let store = CredentialStore::new(tmp.path())?;
        store.register("A", "a@x.com", "p1").expect("register");
    }
    // Fresh handle over the same root, as after a process restart
    let store = CredentialStore::new(tmp.path())?;
    let rec = store.find_by_email("a@x.com").expect("record persisted");
    assert_eq!(rec.name, "A");
    assert_eq!(rec.role, Role::Manager, "self-registration always assigns manager");
    Ok(())
}

#[test]
fn remembered_session_round_trip() -> Result<()> {
    let tmp = tempdir()?;
    let store = CredentialStore::new(tmp.path())?;

    let p = Principal {
        id: "1".into(),
        email: "manager@example.com".into(),
        name: "Admin Manager".into(),
        role: Role::Manager,
    };
    store.persist_current_principal(Some(&p))?;
    let restored = store.restore_current_principal().expect("session restores");
    assert_eq!(restored, p);

    store.persist_current_principal(None)?;
    assert!(store.restore_current_principal().is_none(), "cleared session stays cleared");
    Ok(())
}

#[test]
fn persisted_session_document_has_no_secret() -> Result<()> {
    let tmp = tempdir()?;
    let store = CredentialStore::new(tmp.path())?;

    let rec = store.register("A", "a@x.com", "p1").expect("register");
    store.persist_current_principal(Some(&rec.principal()))?;

    let raw = std::fs::read_to_string(tmp.path().join("session.current"))?;
    assert!(!raw.contains("p1"), "secret must never reach the session document");
    assert!(!raw.contains("credentialSecret"));
    Ok(())
}

#[test]
fn corrupt_session_document_restores_none_and_is_removed() -> Result<()> {
    let tmp = tempdir()?;
    let store = CredentialStore::new(tmp.path())?;

    let path = tmp.path().join("session.current");
    std::fs::write(&path, "{ not json")?;
    assert!(store.restore_current_principal().is_none(), "corrupt document restores anonymous");
    assert!(!path.exists(), "corrupt document is removed");
    Ok(())
}
