use tempfile::TempDir;
use tenantctl::credentials::{CredentialStore, HtpasswdStore};

#[tokio::test]
async fn htpasswd_entry_verifies_and_rotates() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("htpasswd").join("user-001.htpasswd");
    let store = HtpasswdStore;

    assert!(!store.has_entry(&file, "user-001").await.unwrap());
    store.write_entry(&file, "user-001", "first-secret-123").await.unwrap();
    assert!(store.has_entry(&file, "user-001").await.unwrap());

    let verify = |secret: &str| {
        std::process::Command::new("htpasswd")
            .args(["-v", "-b"])
            .arg(&file)
            .arg("user-001")
            .arg(secret)
            .output()
            .unwrap()
            .status
            .success()
    };
    assert!(verify("first-secret-123"));

    store.write_entry(&file, "user-001", "second-secret-456").await.unwrap();
    assert!(verify("second-secret-456"));
    assert!(!verify("first-secret-123"));

    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(content.lines().count(), 1, "rotation replaces the entry");
    assert!(!content.contains("second-secret-456"), "store holds only the hash");
}
