use tenantctl::journal::{JournalLogSource, LogSource};

#[tokio::test]
async fn tail_of_unknown_unit_is_empty_not_an_error() {
    let source = JournalLogSource::new("tenantctl-test-nonexistent");
    let lines = source.tail("user-999", 10).await.unwrap();
    assert!(lines.is_empty());
}
