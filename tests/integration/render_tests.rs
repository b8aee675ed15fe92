use serde_json::json;
use steep::cache::{CacheError, TemplateCache};
use steep::engine::{EngineError, EngineKind, Template};
use tempfile::TempDir;

use super::support::{contents_cache, nested_tree, write_file};

#[test]
fn test_render_missing_key_is_not_found() {
    let (_, cache) = contents_cache();
    let mut out = Vec::new();

    let err = cache.render(&mut out, "missing", &json!({})).unwrap_err();
    assert!(matches!(err, CacheError::NotFound(ref key) if key == "missing"));
    assert_eq!(err.to_string(), "template 'missing' not found");
    assert!(out.is_empty());
}

#[test]
fn test_render_present_key_delegates_to_engine() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();
    cache.compile_default(dir.path()).unwrap();

    let mut out = Vec::new();
    cache.render(&mut out, "sub/sub2/c", &json!({})).unwrap();
    assert_eq!(out, b"c");
}

#[test]
fn test_render_surfaces_engine_error() {
    let dir = nested_tree();
    let (_, cache) = contents_cache();
    cache.compile_default(dir.path()).unwrap();

    let err = cache
        .render_to_string("a", &json!({"explode": true}))
        .unwrap_err();
    match err {
        CacheError::Render { key, source } => {
            assert_eq!(key, "a");
            assert_eq!(source.to_string(), "render exploded");
        }
        other => panic!("Expected Render error, got {:?}", other),
    }
}

fn html_site() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "partials/header.html", "<h1>{{ title }}</h1>\n");
    write_file(
        dir.path(),
        "index.html",
        "<html>\n\n{{ include \"partials/header.html\" }}\n<p>{{ body }}</p>\n</html>\n",
    );
    write_file(
        dir.path(),
        "more/test3.html",
        "{% for n in items %}{{ n }};{% endfor %}",
    );
    write_file(dir.path(), "more/ignored.html.j2", "{{ nope }}");
    dir
}

#[test]
fn test_html_engine_end_to_end() {
    let dir = html_site();
    let cache = TemplateCache::with_engine_kind(EngineKind::Html);
    cache.compile_default(dir.path()).unwrap();

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["index", "more/test3", "partials/header"]);

    let page = cache
        .render_to_string("index", &json!({"title": "Tea", "body": "<script>"}))
        .unwrap();
    assert_eq!(
        page,
        "<html>\n<h1>Tea</h1>\n<p>&lt;script&gt;</p>\n</html>"
    );

    let list = cache
        .render_to_string("more/test3", &json!({"items": [1, 2, 3]}))
        .unwrap();
    assert_eq!(list, "1;2;3;");
}

#[test]
fn test_jinja_engine_end_to_end() {
    let dir = html_site();
    let cache = TemplateCache::<Template>::from_engine_name("jinja").unwrap();
    cache.compile_default(dir.path()).unwrap();

    assert_eq!(cache.keys(), vec!["more/ignored"]);
    // Undefined variables render empty in lenient mode
    assert_eq!(cache.render_to_string("more/ignored", &json!({})).unwrap(), "");
}

#[test]
fn test_html_syntax_error_aborts_compile() {
    let dir = html_site();
    write_file(dir.path(), "broken.html", "{% if %}");

    let cache = TemplateCache::with_engine_kind(EngineKind::Html);
    let err = cache.compile_default(dir.path()).unwrap_err();
    match err {
        CacheError::Compile { path, source } => {
            assert!(path.ends_with("broken.html"));
            assert!(matches!(source, EngineError::Template(_)));
        }
        other => panic!("Expected Compile error, got {:?}", other),
    }
    assert!(cache.is_empty());
}

#[test]
fn test_switching_engine_without_recompiling_is_detected() {
    let dir = html_site();
    let cache = TemplateCache::with_engine_kind(EngineKind::Html);
    cache.compile_default(dir.path()).unwrap();

    cache.select_engine("jinja").unwrap();
    let err = cache.render_to_string("more/test3", &json!({"items": []})).unwrap_err();
    assert!(matches!(
        err,
        CacheError::Render {
            source: EngineError::ArtifactMismatch { .. },
            ..
        }
    ));

    // Recompiling with the new engine brings the cache back in line
    cache.compile_default(dir.path()).unwrap();
    assert_eq!(cache.keys(), vec!["more/ignored"]);
}

#[test]
fn test_mustache_engine_end_to_end() {
    let dir = html_site();
    write_file(
        dir.path(),
        "cards/card.html.mustache",
        "<h2>{{title}}</h2>{{{note}}}",
    );
    let cache = TemplateCache::<Template>::from_engine_name("mustache").unwrap();
    cache.compile_default(dir.path()).unwrap();

    // `.html` files do not share the multi-segment extension
    assert_eq!(cache.keys(), vec!["cards/card"]);
    let card = cache
        .render_to_string("cards/card", &json!({"title": "Oolong & co", "note": "<i>fresh</i>"}))
        .unwrap();
    assert_eq!(card, "<h2>Oolong &amp; co</h2><i>fresh</i>");
}
