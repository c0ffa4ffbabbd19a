use folio_catalog::repository::{FileProjectRepository, ProjectRepository};
use folio_catalog::{CatalogError, CatalogService, ErrorKind, OmissionsSource};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

fn record(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Project {id}"),
        "image": format!("{id}.png"),
        "repo_url": format!("https://example.com/{id}.git"),
        "description": "Demo project",
        "demo_url": format!("https://{id}.example.com"),
    })
}

fn write(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(value).expect("encode")).expect("write record");
}

#[tokio::test]
async fn end_to_end_reconciliation() {
    let store = tempfile::tempdir().expect("tempdir");
    let projects = store.path().join("projects");
    std::fs::create_dir(&projects).expect("mkdir");

    write(&projects, "a.json", &record("a"));
    let mut b = record("b");
    b["exclude_paths"] = json!(["img/"]);
    write(&projects, "b.json", &b);
    std::fs::write(projects.join("notes.txt"), "ignored").expect("write");

    let omissions = store.path().join("global_omissions.json");
    std::fs::write(&omissions, r#"["secret/"]"#).expect("write omissions");

    let repository = FileProjectRepository::open(&projects).await.expect("open");
    let service = CatalogService::new(Arc::new(repository), OmissionsSource::new(Some(omissions)));

    let b = service.get_project("b").await.expect("get").expect("b exists");
    assert_eq!(b.effective_exclude_paths, ["img/", "secret/"]);
    assert_eq!(b.project.exclude_paths(), ["img/"]);

    let a = service.get_project("a").await.expect("get").expect("a exists");
    assert_eq!(a.effective_exclude_paths, ["secret/"]);
    assert_eq!(a.project.image.as_deref(), Some("a.png"));

    assert!(service.get_project("z").await.expect("get").is_none());

    let ids: Vec<String> =
        service.list_projects().await.expect("list").into_iter().map(|v| v.project.id).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[tokio::test]
async fn stored_record_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut value = record("gallery");
    value["exclude_paths"] = json!(["raw/", "cache/"]);
    write(dir.path(), "gallery.json", &value);

    let repository = FileProjectRepository::open(dir.path()).await.expect("open");
    let project = repository.get_project("gallery").await.expect("get").expect("present");

    assert_eq!(serde_json::to_value(&project).expect("encode"), value);
    assert_eq!(repository.backend(), "files");
}

#[tokio::test]
async fn empty_directory_lists_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = FileProjectRepository::open(dir.path()).await.expect("open");
    assert!(repository.list_projects().await.expect("list").is_empty());
}

#[tokio::test]
async fn missing_title_fails_list_and_get() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut broken = record("broken");
    broken.as_object_mut().map(|o| o.remove("title"));
    write(dir.path(), "broken.json", &broken);

    let repository = FileProjectRepository::open(dir.path()).await.expect("open");

    let err = repository.get_project("broken").await.expect_err("invalid record");
    assert!(matches!(err, CatalogError::Validation { .. }));
    assert!(err.to_string().contains("broken.json"));

    let err = repository.list_projects().await.expect_err("invalid record");
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn unparseable_file_is_a_validation_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("junk.json"), "{ not json").expect("write");

    let repository = FileProjectRepository::open(dir.path()).await.expect("open");
    let err = repository.get_project("junk").await.expect_err("syntax error");
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn vanished_directory_is_a_storage_error_for_get_and_list() {
    let store = tempfile::tempdir().expect("tempdir");
    let projects = store.path().join("projects");
    std::fs::create_dir(&projects).expect("mkdir");
    write(&projects, "a.json", &record("a"));

    let repository = FileProjectRepository::open(&projects).await.expect("open");
    std::fs::remove_dir_all(&projects).expect("remove store");

    let err = repository.get_project("a").await.expect_err("directory is gone");
    assert!(matches!(err, CatalogError::Storage { .. }));
    assert_eq!(err.kind(), ErrorKind::Storage);

    let err = repository.list_projects().await.expect_err("directory is gone");
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[tokio::test]
async fn non_file_entries_are_absent_for_get_and_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("x.json")).expect("mkdir");

    let repository = FileProjectRepository::open(dir.path()).await.expect("open");
    assert!(repository.list_projects().await.expect("list").is_empty());
    assert!(repository.get_project("x").await.expect("get").is_none());
}

#[tokio::test]
async fn ids_with_double_dots_inside_are_served() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "v1..2.json", &record("v1..2"));

    let repository = FileProjectRepository::open(dir.path()).await.expect("open");
    let project = repository.get_project("v1..2").await.expect("get").expect("present");
    assert_eq!(project.id, "v1..2");
    assert!(repository.get_project("..").await.expect("get").is_none());
}
