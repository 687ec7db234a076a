// Reconciliation engine tests against an in-memory directory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::*;
use crate::error_handling::{HiveError, RecordError};
use crate::hive::{
    AssetNode, AttachmentRef, Directory, EntityId, HostnameEntity, NoteEntity, ProjectSummary,
};
use crate::identity::Identity;
use crate::input::{ResponseCode, ScreenshotRecord};
use crate::session::SessionContext;

const PROJECT: &str = "42";

#[derive(Default)]
struct FakeState {
    next_id: i64,
    assets: Vec<AssetNode>,
    calls: Vec<String>,
    /// Statuses returned by upcoming search calls, consumed front first
    search_failures: VecDeque<u16>,
}

/// In-memory directory mirroring how Hive nests hostnames and notes.
#[derive(Default)]
struct FakeDirectory {
    state: Mutex<FakeState>,
}

impl FakeDirectory {
    fn with_assets(assets: Vec<AssetNode>) -> Self {
        let next_id = 1000;
        Self {
            state: Mutex::new(FakeState {
                next_id,
                assets,
                ..Default::default()
            }),
        }
    }

    fn fail_searches(&self, statuses: &[u16]) {
        self.state
            .lock()
            .unwrap()
            .search_failures
            .extend(statuses.iter().copied());
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("search") && !c.starts_with("get_note"))
            .collect()
    }

    fn assets(&self) -> Vec<AssetNode> {
        self.state.lock().unwrap().assets.clone()
    }

    fn note_texts(&self) -> Vec<String> {
        self.assets()
            .iter()
            .flat_map(|a| a.notes.iter().map(|n| n.text().to_string()))
            .collect()
    }
}

impl FakeState {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::Number(self.next_id)
    }

    fn note_mut(&mut self, note_id: &EntityId) -> Option<&mut NoteEntity> {
        self.assets
            .iter_mut()
            .flat_map(|a| a.notes.iter_mut())
            .find(|n| &n.id == note_id)
    }
}

impl Directory for FakeDirectory {
    async fn list_projects(
        &self,
        _session: &SessionContext,
    ) -> Result<Vec<ProjectSummary>, HiveError> {
        Ok(Vec::new())
    }

    async fn search_assets(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        identity: &Identity,
    ) -> Result<Vec<AssetNode>, HiveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("search {}", identity));
        if let Some(status) = state.search_failures.pop_front() {
            return Err(HiveError::Status {
                operation: "search assets",
                status,
                body: String::new(),
            });
        }
        Ok(state
            .assets
            .iter()
            .filter(|a| match identity {
                Identity::Ip(ip) => a.ip.as_deref() == Some(ip.as_str()),
                Identity::Hostname(name) => a
                    .hostnames
                    .iter()
                    .any(|h| h.hostname.as_deref() == Some(name.as_str())),
            })
            .cloned()
            .collect())
    }

    async fn create_asset(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        identity: &Identity,
    ) -> Result<AssetNode, HiveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_asset {}", identity));
        let id = state.next_id();
        let asset = match identity {
            Identity::Ip(ip) => AssetNode {
                id,
                ip: Some(ip.clone()),
                hostnames: Vec::new(),
                notes: Vec::new(),
            },
            Identity::Hostname(name) => {
                let hostname_id = state.next_id();
                AssetNode {
                    id,
                    ip: None,
                    hostnames: vec![HostnameEntity {
                        id: hostname_id,
                        hostname: Some(name.clone()),
                    }],
                    notes: Vec::new(),
                }
            }
        };
        state.assets.push(asset.clone());
        Ok(asset)
    }

    async fn upload_attachment(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        node_id: &EntityId,
        path: &Path,
    ) -> Result<AttachmentRef, HiveError> {
        if !path.exists() {
            return Err(HiveError::FileNotFound(path.to_path_buf()));
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("upload {}", node_id));
        let id = state.next_id();
        Ok(AttachmentRef(format!("uuid-{id}")))
    }

    async fn create_note(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        node_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_note {}", node_id));
        let id = state.next_id();
        let asset = state
            .assets
            .iter_mut()
            .find(|a| &a.id == node_id || a.hostnames.iter().any(|h| &h.id == node_id))
            .expect("note target exists");
        asset.notes.push(NoteEntity {
            id,
            text: Some(text.to_string()),
        });
        Ok(())
    }

    async fn get_note_text(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        note_id: &EntityId,
    ) -> Result<String, HiveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_note {}", note_id));
        Ok(state
            .note_mut(note_id)
            .map(|n| n.text().to_string())
            .unwrap_or_default())
    }

    async fn patch_note(
        &self,
        _session: &SessionContext,
        _project_id: &str,
        note_id: &EntityId,
        text: &str,
    ) -> Result<(), HiveError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("patch_note {}", note_id));
        let note = state.note_mut(note_id).expect("note exists");
        note.text = Some(text.to_string());
        Ok(())
    }
}

fn session() -> SessionContext {
    SessionContext::new("http://hive.test", "token")
}

fn record(url: &str, file_name: &str) -> ScreenshotRecord {
    ScreenshotRecord {
        url: url.to_string(),
        final_url: url.to_string(),
        response_code: ResponseCode::Number(200),
        protocol: "HTTP/1.1".to_string(),
        file_name: file_name.to_string(),
    }
}

fn screenshots(names: &[&str]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), b"\xff\xd8\xff").unwrap();
    }
    let path = dir.path().to_path_buf();
    (dir, path)
}

#[tokio::test]
async fn test_creates_ip_asset_and_note() {
    let directory = FakeDirectory::with_assets(Vec::new());
    let (_guard, dir) = screenshots(&["a.jpeg"]);
    let records = vec![record("http://10.0.0.5/x", "a.jpeg")];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.nodes_created, 1);
    assert_eq!(report.notes_created, 1);
    assert!(report.failures.is_empty());
    let assets = directory.assets();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].ip.as_deref(), Some("10.0.0.5"));
    assert!(assets[0].notes[0].text().contains("Gowitness http://10.0.0.5/x"));
}

#[tokio::test]
async fn test_rerun_creates_exactly_one_asset() {
    let directory = FakeDirectory::with_assets(Vec::new());
    let (_guard, dir) = screenshots(&["a.jpeg"]);
    let records = vec![record("https://example.com/", "a.jpeg")];

    let first = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();
    let second = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(first.nodes_created, 1);
    assert_eq!(second.nodes_created, 0);
    assert_eq!(second.nodes_reused, 1);
    assert_eq!(directory.assets().len(), 1);
    // Notes are additive: the rerun appends to the same note
    assert_eq!(second.notes_appended, 1);
    assert_eq!(directory.note_texts().len(), 1);
}

#[tokio::test]
async fn test_same_url_twice_in_one_batch_appends() {
    let directory = FakeDirectory::with_assets(Vec::new());
    let (_guard, dir) = screenshots(&["a.jpeg", "b.jpeg"]);
    let records = vec![
        record("https://example.com/", "a.jpeg"),
        record("https://example.com/", "b.jpeg"),
    ];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.nodes_created, 1);
    assert_eq!(report.notes_created, 1);
    assert_eq!(report.notes_appended, 1);
    let texts = directory.note_texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].matches("<details>").count(), 2);
}

#[tokio::test]
async fn test_existing_note_is_appended_not_replaced() {
    let f1 = "<details>\n<summary>Gowitness https://example.com/</summary><br>\nold\n</details>";
    let directory = FakeDirectory::with_assets(vec![AssetNode {
        id: EntityId::Number(1),
        ip: None,
        hostnames: vec![HostnameEntity {
            id: EntityId::Number(2),
            hostname: Some("example.com".to_string()),
        }],
        notes: vec![NoteEntity {
            id: EntityId::Number(3),
            text: Some(f1.to_string()),
        }],
    }]);
    let (_guard, dir) = screenshots(&["a.jpeg"]);
    let records = vec![record("https://example.com/", "a.jpeg")];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.notes_appended, 1);
    // First id handed out by the fake goes to the upload
    let f2 = render_fragment(
        &records[0],
        PROJECT,
        &AttachmentRef("uuid-1001".to_string()),
    );
    assert_eq!(directory.note_texts(), vec![format!("{f1}\n{f2}")]);
    // Upload went to the hostname entity, not the root asset
    assert!(directory.calls().contains(&"upload 2".to_string()));
}

#[tokio::test]
async fn test_hostname_asset_without_hostname_entity_is_skipped() {
    let directory = FakeDirectory::with_assets(vec![AssetNode {
        id: EntityId::Number(1),
        ip: None,
        hostnames: Vec::new(),
        notes: Vec::new(),
    }]);
    let (_guard, dir) = screenshots(&["a.jpeg"]);

    // Hive can return a root asset without hostname children; the fake's
    // hostname search cannot, so this wrapper returns every asset.
    struct BareRoot<'a>(&'a FakeDirectory);
    impl Directory for BareRoot<'_> {
        async fn list_projects(
            &self,
            s: &SessionContext,
        ) -> Result<Vec<ProjectSummary>, HiveError> {
            self.0.list_projects(s).await
        }
        async fn search_assets(
            &self,
            _s: &SessionContext,
            _p: &str,
            identity: &Identity,
        ) -> Result<Vec<AssetNode>, HiveError> {
            self.0
                .state
                .lock()
                .unwrap()
                .calls
                .push(format!("search {}", identity));
            Ok(self.0.assets())
        }
        async fn create_asset(
            &self,
            s: &SessionContext,
            p: &str,
            i: &Identity,
        ) -> Result<AssetNode, HiveError> {
            self.0.create_asset(s, p, i).await
        }
        async fn upload_attachment(
            &self,
            s: &SessionContext,
            p: &str,
            n: &EntityId,
            path: &Path,
        ) -> Result<AttachmentRef, HiveError> {
            self.0.upload_attachment(s, p, n, path).await
        }
        async fn create_note(
            &self,
            s: &SessionContext,
            p: &str,
            n: &EntityId,
            t: &str,
        ) -> Result<(), HiveError> {
            self.0.create_note(s, p, n, t).await
        }
        async fn get_note_text(
            &self,
            s: &SessionContext,
            p: &str,
            n: &EntityId,
        ) -> Result<String, HiveError> {
            self.0.get_note_text(s, p, n).await
        }
        async fn patch_note(
            &self,
            s: &SessionContext,
            p: &str,
            n: &EntityId,
            t: &str,
        ) -> Result<(), HiveError> {
            self.0.patch_note(s, p, n, t).await
        }
    }

    let records = vec![record("https://example.com/", "a.jpeg")];
    let report = reconcile(&BareRoot(&directory), &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.failures[0].error,
        RecordError::MissingHostnameEntity(ref name) if name == "example.com"
    ));
    assert!(directory.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_missing_screenshot_makes_no_directory_calls() {
    let directory = FakeDirectory::with_assets(Vec::new());
    let (_guard, dir) = screenshots(&[]);
    let records = vec![record("https://example.com/", "absent.jpeg")];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.failures[0].error,
        RecordError::ScreenshotMissing(_)
    ));
    assert!(directory.calls().is_empty());
    assert!(directory.assets().is_empty());
}

#[tokio::test]
async fn test_failures_do_not_stop_the_batch() {
    let directory = FakeDirectory::with_assets(Vec::new());
    let (_guard, dir) = screenshots(&["b.jpeg", "c.jpeg"]);
    let records = vec![
        record("https://a.test/", "a.jpeg"),
        record("https://", "b.jpeg"),
        record("https://c.test/", "c.jpeg"),
    ];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.failed(), 2);
    assert!(matches!(
        report.failures[1].error,
        RecordError::Identity(_)
    ));
    assert_eq!(report.succeeded(), 1);
    assert_eq!(directory.assets().len(), 1);
}

#[tokio::test]
async fn test_exhausted_transient_failure_is_per_record() {
    let directory = FakeDirectory::with_assets(Vec::new());
    directory.fail_searches(&[503]);
    let (_guard, dir) = screenshots(&["a.jpeg", "b.jpeg"]);
    let records = vec![
        record("https://a.test/", "a.jpeg"),
        record("https://b.test/", "b.jpeg"),
    ];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].url, "https://a.test/");
    assert_eq!(report.notes_created, 1);
}

#[tokio::test]
async fn test_non_transient_failure_is_fatal() {
    let directory = FakeDirectory::with_assets(Vec::new());
    directory.fail_searches(&[400]);
    let (_guard, dir) = screenshots(&["a.jpeg", "b.jpeg"]);
    let records = vec![
        record("https://a.test/", "a.jpeg"),
        record("https://b.test/", "b.jpeg"),
    ];

    let err = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap_err();

    assert!(matches!(err, HiveError::Status { status: 400, .. }));
    // Second record never reached
    assert_eq!(directory.calls(), vec!["search a.test".to_string()]);
}

#[tokio::test]
async fn test_ambiguous_notes_use_first_and_are_counted() {
    let directory = FakeDirectory::with_assets(vec![AssetNode {
        id: EntityId::Number(1),
        ip: Some("10.0.0.5".to_string()),
        hostnames: Vec::new(),
        notes: vec![
            NoteEntity {
                id: EntityId::Number(10),
                text: Some("Gowitness http://10.0.0.5/ one".to_string()),
            },
            NoteEntity {
                id: EntityId::Number(11),
                text: Some("Gowitness http://10.0.0.5/ two".to_string()),
            },
        ],
    }]);
    let (_guard, dir) = screenshots(&["a.jpeg"]);
    let records = vec![record("http://10.0.0.5/", "a.jpeg")];

    let report = reconcile(&directory, &session(), PROJECT, &dir, &records)
        .await
        .unwrap();

    assert_eq!(report.ambiguous_notes, 1);
    assert!(directory.calls().contains(&"patch_note 10".to_string()));
    assert!(!directory.calls().contains(&"patch_note 11".to_string()));
    // IP identities attach to the asset itself
    assert!(directory.calls().contains(&"upload 1".to_string()));
}
