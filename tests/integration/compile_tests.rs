use std::collections::BTreeSet;
use std::sync::Arc;

use steep::cache::CacheError;
use steep::compiler::{CollisionPolicy, CompileOptions};
use tempfile::TempDir;

use super::support::{contents_cache, nested_tree, write_file};

fn key_set(keys: Vec<String>) -> BTreeSet<String> {
    keys.into_iter().collect()
}

fn expected(keys: &[&str]) -> BTreeSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_compile_recursive_key_derivation() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();

    let count = cache
        .compile(dir.path(), &CompileOptions::new(".ext", true))
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(key_set(cache.keys()), expected(&["a", "sub/b", "sub/sub2/c"]));
}

#[test]
fn test_compile_non_recursive_only_top_level() {
    let dir = nested_tree();
    let (engine, cache) = contents_cache();

    cache
        .compile(dir.path(), &CompileOptions::new(".ext", false))
        .unwrap();

    assert_eq!(key_set(cache.keys()), expected(&["a"]));
    assert_eq!(engine.compiles(), 1);
}

#[test]
fn test_compile_skips_non_matching_files() {
    let dir = nested_tree();
    let (engine, cache) = contents_cache();

    cache.compile_default(dir.path()).unwrap();

    assert!(cache.get("notes").is_none());
    assert_eq!(engine.compiles(), 3);
}

#[test]
fn test_compile_is_idempotent() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();

    cache.compile_default(dir.path()).unwrap();
    let first = cache.snapshot();
    cache.compile_default(dir.path()).unwrap();
    let second = cache.snapshot();

    assert_eq!(first.len(), second.len());
    for (key, artifact) in &first {
        assert_eq!(artifact.as_str(), second[key].as_str());
    }
}

#[test]
fn test_failed_compile_leaves_cache_untouched() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();
    cache.compile_default(dir.path()).unwrap();
    let before = cache.snapshot();

    // A broken template deep in a second tree
    let broken = TempDir::new().unwrap();
    write_file(broken.path(), "ok.ext", "fine");
    write_file(broken.path(), "deep/er/bad.ext", "FAIL");

    let err = cache.compile_default(broken.path()).unwrap_err();
    match err {
        CacheError::Compile { path, .. } => assert!(path.ends_with("deep/er/bad.ext")),
        other => panic!("Expected Compile error, got {:?}", other),
    }

    let after = cache.snapshot();
    assert_eq!(
        key_set(before.keys().cloned().collect()),
        key_set(after.keys().cloned().collect())
    );
    for (key, artifact) in &before {
        assert!(Arc::ptr_eq(artifact, &after[key]));
    }
}

#[test]
fn test_failed_compile_on_empty_cache_stays_empty() {
    let (_, cache) = contents_cache();
    let missing = TempDir::new().unwrap().path().join("blah");

    assert!(cache.compile_default(&missing).is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_compile_missing_root() {
    let dir = TempDir::new().unwrap();
    let (_, cache) = contents_cache();

    let err = cache.compile_default(dir.path().join("blah")).unwrap_err();
    assert!(matches!(err, CacheError::Filesystem { .. }));
}

#[test]
fn test_compile_invalid_extension_is_configuration_error() {
    let dir = nested_tree();
    let (engine, cache) = contents_cache();

    let err = cache
        .compile(dir.path(), &CompileOptions::new("ext", true))
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(engine.compiles(), 0);
}

#[test]
fn test_compile_replaces_after_delete() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();
    cache.compile_default(dir.path()).unwrap();
    cache.delete("a");
    assert!(cache.get("a").is_none());

    cache.compile_default(dir.path()).unwrap();
    assert_eq!(cache.get("a").unwrap().as_str(), "a");
}

#[test]
fn test_compile_with_last_write_wins_policy_accepts_tree() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();
    let options =
        CompileOptions::new(".ext", true).with_collision_policy(CollisionPolicy::LastWriteWins);

    assert_eq!(cache.compile(dir.path(), &options).unwrap(), 3);
}
