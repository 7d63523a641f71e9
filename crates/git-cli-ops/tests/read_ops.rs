mod common;

use common::{commit_all, git, init_repo, test_client, write_file};
use git_cli_ops::{
    list_references, object_headers, read_blob, read_commit, read_object, read_tree, rev_parse,
    status, GitCliError, GitErrorKind, GitObject, NameFilter, ObjectType, ReferenceType,
    StatusInput,
};
use git_error_classifier::ReferenceErrorReason;
use git_object_model::{EntryMode, StatusRecordKind};
use std::collections::HashSet;

#[tokio::test]
async fn rev_parse_and_read_commit() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "README.md", "hello\n");
    let first = commit_all(&client, &repo.path, "Initial commit").await;
    write_file(&repo.path, "README.md", "hello again\n");
    let second = commit_all(&client, &repo.path, "Second commit\n\nWith a body.").await;

    assert_eq!(rev_parse(&client, &repo.path, "HEAD").await.unwrap(), second);
    assert_eq!(rev_parse(&client, &repo.path, "HEAD~1").await.unwrap(), first);

    let commit = read_commit(&client, &repo.path, "main").await.unwrap();
    assert_eq!(commit.id, second);
    assert_eq!(commit.parents, vec![first]);
    assert_eq!(commit.summary(), "Second commit");
    assert_eq!(commit.author.name, "Test Author");
    assert_eq!(commit.committer.email, "author@example.com");
    assert!(!commit.is_merge());
}

#[tokio::test]
async fn read_tree_with_and_without_filter() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "a.txt", "a\n");
    write_file(&repo.path, "src/lib.rs", "// lib\n");
    write_file(&repo.path, "z.txt", "z\n");
    commit_all(&client, &repo.path, "Tree").await;

    let tree = read_tree(&client, &repo.path, "HEAD", None).await.unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.blobs.len(), 2);
    assert_eq!(tree.trees.len(), 1);
    let src = tree.find("src").unwrap();
    assert_eq!(src.mode, EntryMode::Tree);

    let sub = read_tree(&client, &repo.path, &src.id.revision_text(), None)
        .await
        .unwrap();
    assert_eq!(sub.find("lib.rs").unwrap().mode, EntryMode::File);

    let only_txt = |name: &str| name.ends_with(".txt");
    let filter: NameFilter<'_> = &only_txt;
    let filtered = read_tree(&client, &repo.path, "HEAD", Some(filter))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.find("src").is_none());
}

#[tokio::test]
async fn read_blob_and_object() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "notes.txt", "line one\nline two\n");
    commit_all(&client, &repo.path, "Notes").await;

    let blob = read_blob(&client, &repo.path, "HEAD:notes.txt").await.unwrap();
    assert_eq!(blob.text(), Some("line one\nline two\n"));

    match read_object(&client, &repo.path, "HEAD").await.unwrap() {
        GitObject::Commit(commit) => assert_eq!(commit.summary(), "Notes"),
        other => panic!("expected commit, got {other:?}"),
    }
    let err = read_object(&client, &repo.path, "does-not-exist").await.unwrap_err();
    assert_eq!(err.code(), "object_not_found");
}

#[tokio::test]
async fn batch_headers_keep_input_order() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "f.txt", "12345");
    commit_all(&client, &repo.path, "One").await;

    let revisions = ["HEAD", "nope", "HEAD:f.txt", "HEAD^{tree}"];
    let headers = object_headers(&client, &repo.path, &revisions)
        .await
        .unwrap();
    assert_eq!(headers.len(), 4);
    assert_eq!(headers[0].unwrap().object_type, ObjectType::Commit);
    assert!(headers[1].is_none());
    let blob = headers[2].unwrap();
    assert_eq!(blob.object_type, ObjectType::Blob);
    assert_eq!(blob.size, 5);
    assert_eq!(headers[3].unwrap().object_type, ObjectType::Tree);
}

#[tokio::test]
async fn references_are_sorted_with_peeled_tags() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "a.txt", "a\n");
    let head = commit_all(&client, &repo.path, "Tagged").await;
    git(&client, &repo.path, &["branch", "feature"]).await;
    git(&client, &repo.path, &["tag", "light"]).await;
    git(&client, &repo.path, &["tag", "-a", "v1.0", "-m", "Release"]).await;

    let refs = list_references(&client, &repo.path, &[]).await.unwrap();
    let names: Vec<&str> = refs.iter().map(|r| r.canonical_name()).collect();
    assert_eq!(
        names,
        vec!["refs/heads/feature", "refs/heads/main", "refs/tags/light", "refs/tags/v1.0"]
    );

    let annotated = &refs[3];
    assert_eq!(annotated.reference_type(), ReferenceType::Tags);
    assert_eq!(annotated.friendly_name(), "v1.0");
    assert_eq!(annotated.object_type(), ObjectType::Tag);
    assert_ne!(annotated.object_id(), head);
    assert_eq!(annotated.tip(), Some(head));
    assert_eq!(refs[2].tip(), Some(head));

    let heads = list_references(&client, &repo.path, &["refs/heads"]).await.unwrap();
    assert_eq!(heads.len(), 2);
    assert!(heads.iter().all(|r| r.is_branch()));
}

#[tokio::test]
async fn status_reports_changes() {
    let client = test_client();
    let repo = init_repo(&client).await;
    write_file(&repo.path, "tracked.txt", "v1\n");
    write_file(&repo.path, "old.txt", "rename me, I am long enough to be detected\n");
    commit_all(&client, &repo.path, "Base").await;

    let clean = status(&client, &repo.path, StatusInput::default()).await.unwrap();
    assert!(clean.is_clean());
    assert_eq!(clean.branch.head.as_deref(), Some("main"));

    write_file(&repo.path, "tracked.txt", "v2\n");
    write_file(&repo.path, "new.txt", "new\n");
    git(&client, &repo.path, &["mv", "old.txt", "renamed.txt"]).await;

    let report = status(&client, &repo.path, StatusInput::default()).await.unwrap();
    assert!(!report.is_clean());

    let modified = report.entries.iter().find(|e| e.path == "tracked.txt").unwrap();
    assert_eq!(modified.kind, StatusRecordKind::Ordinary);
    assert!(!modified.is_staged());

    let renamed = report.entries.iter().find(|e| e.path == "renamed.txt").unwrap();
    assert_eq!(renamed.kind, StatusRecordKind::RenamedOrCopied);
    assert_eq!(renamed.original_path.as_deref(), Some("old.txt"));

    let untracked = report.entries.iter().find(|e| e.path == "new.txt").unwrap();
    assert_eq!(untracked.kind, StatusRecordKind::Untracked);
}

#[tokio::test]
async fn ambiguous_short_id_is_classified() {
    let client = test_client();
    let repo = init_repo(&client).await;

    // Enough blobs that two of them share a four-digit prefix.
    let names: Vec<String> = (0..2000).map(|i| format!("blob-{i:04}.txt")).collect();
    for (i, name) in names.iter().enumerate() {
        write_file(&repo.path, name, &format!("content {i}\n"));
    }
    let mut args = vec!["hash-object", "-w", "--"];
    args.extend(names.iter().map(String::as_str));
    let ids = git(&client, &repo.path, &args).await;

    let mut seen = HashSet::new();
    let prefix = ids
        .lines()
        .map(|id| &id[..4])
        .find(|prefix| !seen.insert(*prefix))
        .expect("two blobs share a prefix")
        .to_string();

    let err = rev_parse(&client, &repo.path, &prefix).await.unwrap_err();
    match err {
        GitCliError::Command(err) => assert_eq!(
            err.kind,
            GitErrorKind::Reference {
                reason: ReferenceErrorReason::Ambiguous,
                name: Some(prefix),
                reference_type: None,
            }
        ),
        other => panic!("expected a classified git failure, got {other:?}"),
    }
}
