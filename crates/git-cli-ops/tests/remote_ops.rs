mod common;

use common::{commit_all, file_url, git, init_bare, init_repo, test_client, write_file, TestRepo};
use git_cli_ops::{
    checkout, clone, fetch, pull, push, read_tree, rev_parse, submodule_update, CheckoutInput,
    CloneInput, FetchInput, GitCliError, GitClient, GitErrorKind, ProgressEvent, PullInput,
    PushInput, SubmoduleEvent, SubmoduleUpdateInput,
};
use git_error_classifier::PushRejectionReason;
use std::path::PathBuf;

/// Bare origin with one commit on `main`.
async fn seeded_origin(client: &GitClient) -> TestRepo {
    let origin = init_bare(client).await;
    let seed = init_repo(client).await;
    write_file(&seed.path, "README.md", "seed\n");
    commit_all(client, &seed.path, "Seed").await;
    git(client, &seed.path, &["push", origin.path.to_str().unwrap(), "main"]).await;
    origin
}

async fn clone_into(client: &GitClient, origin: &TestRepo, name: &str) -> PathBuf {
    let destination = origin.dir.path().join(name);
    clone(
        client,
        CloneInput {
            url: file_url(&origin.path),
            destination: destination.clone(),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();
    destination
}

#[tokio::test]
async fn clone_reports_progress() {
    let client = test_client();
    let origin = seeded_origin(&client).await;
    let destination = origin.dir.path().join("work");

    let mut events = Vec::new();
    clone(
        &client,
        CloneInput {
            url: file_url(&origin.path),
            destination: destination.clone(),
            branch: Some("main".into()),
            ..Default::default()
        },
        Some(&mut |event: ProgressEvent| events.push(event)),
    )
    .await
    .unwrap();

    assert!(!events.is_empty());
    assert!(events.iter().all(|e| !e.is_error()));
    assert_eq!(
        rev_parse(&client, &destination, "HEAD").await.unwrap(),
        rev_parse(&client, &origin.path, "main").await.unwrap()
    );
}

#[tokio::test]
async fn fetch_push_rejection_and_pull() {
    let client = test_client();
    let origin = seeded_origin(&client).await;
    let alice = clone_into(&client, &origin, "alice").await;
    let bob = clone_into(&client, &origin, "bob").await;

    write_file(&alice, "alice.txt", "a\n");
    let alice_head = commit_all(&client, &alice, "Alice").await;
    push(&client, &alice, PushInput::default(), None).await.unwrap();

    write_file(&bob, "bob.txt", "b\n");
    commit_all(&client, &bob, "Bob").await;
    let err = push(&client, &bob, PushInput::default(), None).await.unwrap_err();
    match err {
        GitCliError::Command(err) => match err.kind {
            GitErrorKind::PushRejected {
                reason,
                rejected_refs,
            } => {
                assert_eq!(reason, PushRejectionReason::FetchFirst);
                assert_eq!(rejected_refs.len(), 1);
                assert_eq!(rejected_refs[0].destination, "main");
                assert!(!rejected_refs[0].remote_rejected);
            }
            other => panic!("unexpected kind {other:?}"),
        },
        other => panic!("unexpected error {other:?}"),
    }

    let mut events = Vec::new();
    fetch(
        &client,
        &bob,
        FetchInput {
            remote: Some("origin".into()),
            prune: true,
            ..Default::default()
        },
        Some(&mut |event: ProgressEvent| events.push(event)),
    )
    .await
    .unwrap();
    assert_eq!(
        rev_parse(&client, &bob, "origin/main").await.unwrap(),
        alice_head
    );
    // A second fetch with nothing new still succeeds.
    fetch(&client, &bob, FetchInput::default(), None).await.unwrap();

    pull(&client, &bob, PullInput::default(), None).await.unwrap();
    assert!(bob.join("alice.txt").exists());
    push(&client, &bob, PushInput::default(), None).await.unwrap();
    assert_eq!(
        rev_parse(&client, &origin.path, "main").await.unwrap(),
        rev_parse(&client, &bob, "HEAD").await.unwrap()
    );
}

#[tokio::test]
async fn push_from_detached_head() {
    let client = test_client();
    let origin = seeded_origin(&client).await;
    let work = clone_into(&client, &origin, "work").await;

    checkout(
        &client,
        &work,
        CheckoutInput {
            target: "HEAD".into(),
            detach: true,
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let err = push(&client, &work, PushInput::default(), None).await.unwrap_err();
    assert_eq!(err.code(), "detached_head");
}

#[tokio::test]
async fn submodule_update_reports_submodule_events() {
    let client = test_client();
    let library = init_repo(&client).await;
    write_file(&library.path, "lib.rs", "pub fn lib() {}\n");
    let library_head = commit_all(&client, &library.path, "Library").await;

    let origin = seeded_origin(&client).await;
    let parent = clone_into(&client, &origin, "parent").await;
    git(
        &client,
        &parent,
        &["submodule", "add", library.path.to_str().unwrap(), "lib"],
    )
    .await;
    commit_all(&client, &parent, "Add submodule").await;
    push(&client, &parent, PushInput::default(), None).await.unwrap();

    let fresh = clone_into(&client, &origin, "fresh").await;
    let tree = read_tree(&client, &fresh, "HEAD", None).await.unwrap();
    let gitlink = tree.gitlinks.iter().find(|e| &*e.name == "lib").unwrap();
    assert_eq!(gitlink.id, library_head);

    let mut events = Vec::new();
    submodule_update(
        &client,
        &fresh,
        SubmoduleUpdateInput {
            init: true,
            ..Default::default()
        },
        Some(&mut |event: ProgressEvent| events.push(event)),
    )
    .await
    .unwrap();

    let submodule_events: Vec<&SubmoduleEvent> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Submodule { event } => Some(event),
            _ => None,
        })
        .collect();
    assert!(submodule_events
        .iter()
        .any(|e| matches!(e, SubmoduleEvent::Registered { path, .. } if path == "lib")));
    assert!(submodule_events.iter().any(|e| matches!(
        e,
        SubmoduleEvent::CheckedOut { path, commit }
            if path == "lib" && *commit == library_head.revision_text()
    )));
    assert!(fresh.join("lib").join("lib.rs").exists());
}
