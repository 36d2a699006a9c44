use std::fs;

use pretty_assertions::assert_eq;

use super::*;

fn success_uri(outcome: &LoadOutcome) -> Option<&str> {
    match outcome {
        LoadOutcome::Success { uri, .. } => Some(uri.as_str()),
        _ => None,
    }
}

fn read(outcome: LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Success { content, .. } => content
            .read_now()
            .expect("content present")
            .expect("readable"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn test_bundle_resolves_scheme_and_strips_extension() {
    let bundle = BundleBackend::new("std").with_file("core.br", "fn id() {}");
    let outcome = bundle.try_load("std:core", None);
    assert_eq!(success_uri(&outcome), Some("std:core"));
    assert_eq!(read(outcome), "fn id() {}");
    assert_eq!(
        success_uri(&bundle.try_load("std:core.br", None)),
        Some("std:core")
    );
}

#[test]
fn test_bundle_outcomes_for_unknown_paths() {
    let bundle = BundleBackend::new("std").with_file("core", "");
    assert!(matches!(
        bundle.try_load("std:nope", None),
        LoadOutcome::NotFound { .. }
    ));
    assert!(matches!(
        bundle.try_load("other:core", None),
        LoadOutcome::NextHandler
    ));
    assert!(matches!(
        bundle.try_load("core", None),
        LoadOutcome::NextHandler
    ));
}

#[test]
fn test_bundle_sibling_import_by_bare_name() {
    let bundle = BundleBackend::new("std")
        .with_file("core", "using \"math\";")
        .with_file("math", "");
    let current = FileUri::new("std:core");
    assert_eq!(
        success_uri(&bundle.try_load("math", Some(&current))),
        Some("std:math")
    );
}

#[test]
fn test_memory_backend_matches_with_or_without_extension() {
    let mem = MemoryBackend::new();
    let uri = mem.insert("main.br", "1;");
    assert_eq!(uri.as_str(), "mem:main.br");
    assert_eq!(success_uri(&mem.try_load("mem:main", None)), Some("mem:main.br"));
    assert_eq!(
        success_uri(&mem.try_load("mem:main.br", None)),
        Some("mem:main.br")
    );
    assert!(matches!(
        mem.try_load("mem:other", None),
        LoadOutcome::NotFound { .. }
    ));
    assert!(matches!(
        mem.try_load("main", None),
        LoadOutcome::NextHandler
    ));
}

#[test]
fn test_memory_deferred_fetch_sees_removal() {
    let mem = MemoryBackend::new();
    mem.insert("gone.br", "x;");
    let outcome = mem.try_load_deferred("mem:gone", None);
    assert!(mem.remove("gone.br"));
    let LoadOutcome::Success { content, .. } = outcome else {
        panic!("expected success");
    };
    let err = content.read_now().expect("deferred").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_memory_clones_share_files() {
    let mem = MemoryBackend::new();
    let handle = mem.clone();
    handle.insert("a.br", "");
    assert!(mem.contains("a.br"));
    assert_eq!(mem.len(), 1);
}

#[test]
fn test_filesystem_relative_to_importing_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("main.br"), "using \"lib/util\";").unwrap();
    fs::write(dir.path().join("lib/util.br"), "fn util() {}").unwrap();

    let backend = FileSystemBackend::new(Vec::new());
    let main_path = dir.path().join("main.br").canonicalize().unwrap();
    let current = FileUri::from_path(&main_path);

    let outcome = backend.try_load("lib/util", Some(&current));
    let expected = dir.path().join("lib/util.br").canonicalize().unwrap();
    assert_eq!(
        success_uri(&outcome),
        Some(FileUri::from_path(&expected).as_str())
    );
    assert_eq!(read(outcome), "fn util() {}");
}

#[test]
fn test_filesystem_searches_roots_and_dedups_by_canonical_path() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("pkg")).unwrap();
    fs::write(root.path().join("pkg/a.br"), "").unwrap();

    let backend = FileSystemBackend::new(vec![root.path().to_path_buf()]);
    let current = FileUri::new("mem:main.br");
    let direct = backend.try_load("pkg/a", Some(&current));
    let dotted = backend.try_load("pkg/../pkg/a.br", Some(&current));
    assert!(success_uri(&direct).is_some());
    assert_eq!(success_uri(&direct), success_uri(&dotted));
}

#[test]
fn test_filesystem_not_found_and_foreign_scheme() {
    let root = tempfile::tempdir().unwrap();
    let backend = FileSystemBackend::new(vec![root.path().to_path_buf()]);
    assert!(matches!(
        backend.try_load("missing", None),
        LoadOutcome::NotFound { .. }
    ));
    assert!(matches!(
        backend.try_load("std:core", None),
        LoadOutcome::NextHandler
    ));
}

#[test]
fn test_filesystem_reads_only_when_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.br");
    fs::write(&path, "old").unwrap();
    let backend = FileSystemBackend::new(Vec::new());
    let requested = path.to_str().unwrap();

    let blocking = backend.try_load(requested, None);
    let deferred = backend.try_load_deferred(requested, None);
    fs::write(&path, "new").unwrap();
    assert_eq!(read(blocking), "new");
    assert_eq!(read(deferred), "new");

    let gone = backend.try_load(requested, None);
    fs::remove_file(&path).unwrap();
    let LoadOutcome::Success { content, .. } = gone else {
        panic!("expected success");
    };
    assert!(content.read_now().expect("deferred").unwrap_err().is_not_found());
}

#[test]
fn test_memory_content_is_copied_on_fetch() {
    let mem = MemoryBackend::new();
    mem.insert("main.br", "old");
    let outcome = mem.try_load("mem:main", None);
    mem.insert("main.br", "new");
    assert_eq!(read(outcome), "new");
}
