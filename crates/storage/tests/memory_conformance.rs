use formsmith_storage::conformance::run_conformance_suite;
use formsmith_storage::MemoryStorage;

#[tokio::test]
async fn memory_storage_passes_conformance_suite() {
    let report = run_conformance_suite(|| async { MemoryStorage::new() }).await;
    assert!(report.total > 0, "suite ran no tests");
    assert!(report.failed == 0, "{report}");
}

#[tokio::test]
async fn file_backed_storage_passes_conformance_suite() {
    let dir = tempfile::tempdir().unwrap();
    let counter = std::sync::atomic::AtomicUsize::new(0);
    let report = run_conformance_suite(|| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let path = dir.path().join(format!("store-{}.json", n));
        async move { MemoryStorage::open(path).await.unwrap() }
    })
    .await;
    assert!(report.failed == 0, "{report}");
}
