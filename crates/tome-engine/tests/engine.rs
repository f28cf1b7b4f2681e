//! End-to-end tests for the documentation engine: path resolution,
//! caching, versioning, and search composition against real directory
//! trees.

use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tome_config::Config;
use tome_engine::{Engine, Resolution};

fn write_doc(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn make_engine(tmp: &TempDir) -> Engine {
    Engine::new(make_config(tmp))
}

fn make_config(tmp: &TempDir) -> Config {
    let mut config = Config::default_with_base(tmp.path());
    config.site.default_page = "intro".to_owned();
    config.site.base_url = "https://docs.example.com".to_owned();
    config
}

fn make_versioned_engine(tmp: &TempDir) -> Engine {
    let mut config = make_config(tmp);
    config.versions.enabled = true;
    Engine::new(config)
}

fn docs(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("docs")
}

#[test]
fn test_resolve_page() {
    let tmp = TempDir::new().unwrap();
    write_doc(
        &docs(&tmp),
        "1.intro.md",
        "---\ndescription: First steps\n---\n# Introduction\n\n## Install\n\nRun the installer.\n",
    );

    let engine = make_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };

    assert_eq!(page.title, "Introduction");
    assert_eq!(page.description, "First steps");
    assert_eq!(page.canonical_path, "intro");
    assert_eq!(page.permalink, "https://docs.example.com/intro");
    assert!(page.content.contains("<h1>Introduction</h1>"));
    assert!(page.content.contains(r#"<h2 id="install">"#));
    assert_eq!(page.table_of_contents.len(), 1);
    assert_eq!(page.table_of_contents[0].title, "Install");
    assert!(page.current_version.is_none());
    assert!(page.available_versions.is_empty());
}

#[test]
fn test_empty_path_serves_default_page() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Welcome\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(None, "") else {
        panic!("expected page");
    };
    assert_eq!(page.title, "Welcome");
    assert_eq!(page.canonical_path, "intro");
}

#[test]
fn test_unresolvable_path_is_not_found() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Welcome\n");

    let engine = make_engine(&tmp);
    let Resolution::NotFound(missing) = engine.resolve(None, "nope/nothing") else {
        panic!("expected not found");
    };
    assert_eq!(missing.title, "404 - Not Found");
    assert!(missing.content.contains("404"));
    // The 404 payload still carries live navigation
    assert_eq!(missing.navigation.len(), 1);
    assert_eq!(missing.navigation[0].title(), "Welcome");
}

#[test]
fn test_title_fallback_label() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "no headings at all\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(page.title, "Documentation");
}

#[test]
fn test_previous_and_next_links() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "1.intro.md", "# Intro\n");
    write_doc(&docs(&tmp), "2.guide/1.setup.md", "# Setup\n");
    write_doc(&docs(&tmp), "2.guide/2.usage.md", "# Usage\n");

    let engine = make_engine(&tmp);

    let Resolution::Page(first) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert!(first.previous_page.is_none());
    assert_eq!(first.next_page.as_ref().unwrap().path, "guide/setup");

    let Resolution::Page(middle) = engine.resolve(None, "guide/setup") else {
        panic!("expected page");
    };
    assert_eq!(middle.previous_page.as_ref().unwrap().path, "intro");
    assert_eq!(middle.next_page.as_ref().unwrap().path, "guide/usage");

    let Resolution::Page(last) = engine.resolve(None, "guide/usage") else {
        panic!("expected page");
    };
    assert_eq!(last.previous_page.as_ref().unwrap().path, "guide/setup");
    assert!(last.next_page.is_none());
}

#[test]
fn test_single_page_has_no_neighbors() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert!(page.previous_page.is_none());
    assert!(page.next_page.is_none());
}

#[test]
fn test_modified_source_invalidates_cached_page() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Old Title\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(first) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(first.title, "Old Title");

    sleep(Duration::from_millis(10));
    write_doc(&docs(&tmp), "intro.md", "# New Title\n");

    let Resolution::Page(second) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(second.title, "New Title");
}

#[test]
fn test_cache_hit_merges_fresh_navigation() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(first) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(first.navigation.len(), 1);

    sleep(Duration::from_millis(10));
    write_doc(&docs(&tmp), "extra.md", "# Extra\n");

    // intro.md itself is untouched, so its page entry is still served
    // from cache — but navigation is rebuilt and merged in fresh
    let Resolution::Page(second) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(second.title, "Intro");
    assert_eq!(second.navigation.len(), 2);
}

#[test]
fn test_edit_url_from_repo_config() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "1.guide/setup.md", "# Setup\n");

    let mut config = make_config(&tmp);
    config.site.repo_url = "https://github.com/acme/handbook/".to_owned();
    let engine = Engine::new(config);

    let Resolution::Page(page) = engine.resolve(None, "guide/setup") else {
        panic!("expected page");
    };
    assert_eq!(
        page.edit_url,
        "https://github.com/acme/handbook/blob/main/docs/1.guide/setup.md"
    );
}

#[test]
fn test_edit_url_placeholder_without_repo() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let engine = make_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(page.edit_url, "#");
}

#[test]
fn test_versioned_resolution_from_path() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/intro.md", "# Intro One\n");
    write_doc(&docs(&tmp), "v2.0/intro.md", "# Intro Two\n");

    let engine = make_versioned_engine(&tmp);

    let Resolution::Page(pinned) = engine.resolve(None, "v1.0/intro") else {
        panic!("expected page");
    };
    assert_eq!(pinned.title, "Intro One");
    assert_eq!(pinned.current_version.as_deref(), Some("v1.0"));
    assert_eq!(pinned.permalink, "https://docs.example.com/v1.0/intro");

    // No version segment: the default (highest) version serves
    let Resolution::Page(default) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(default.title, "Intro Two");
    assert_eq!(default.current_version.as_deref(), Some("v2.0"));
    assert_eq!(default.available_versions.len(), 2);
}

#[test]
fn test_unknown_version_falls_back_to_default() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/intro.md", "# Intro One\n");

    let engine = make_versioned_engine(&tmp);
    let Resolution::Page(page) = engine.resolve(Some("v9.9"), "intro") else {
        panic!("expected page");
    };
    assert_eq!(page.current_version.as_deref(), Some("v1.0"));
}

#[test]
fn test_pages_cached_per_version() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/intro.md", "# Intro One\n");
    write_doc(&docs(&tmp), "v2.0/intro.md", "# Intro Two\n");

    let engine = make_versioned_engine(&tmp);

    // Resolve both versions twice; the second pass is served from cache
    for _ in 0..2 {
        let Resolution::Page(one) = engine.resolve(Some("v1.0"), "intro") else {
            panic!("expected page");
        };
        let Resolution::Page(two) = engine.resolve(Some("v2.0"), "intro") else {
            panic!("expected page");
        };
        assert_eq!(one.title, "Intro One");
        assert_eq!(two.title, "Intro Two");
    }
}

#[test]
fn test_search_single_scope() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "deploy.md", "# Deployment\n\ndeploy with care\n");
    write_doc(&docs(&tmp), "other.md", "# Other\n\nnothing here\n");

    let engine = make_engine(&tmp);
    let hits = engine.search("deploy", None);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "deploy");
}

#[test]
fn test_search_empty_query() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let engine = make_engine(&tmp);
    assert!(engine.search("", None).is_empty());
    assert!(engine.search("  ", None).is_empty());
}

#[test]
fn test_search_overlong_query_rejected() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# aaaa\n\naaaa\n");

    let engine = make_engine(&tmp);
    assert!(engine.search(&"a".repeat(201), None).is_empty());
}

#[test]
fn test_cross_version_search_merges_and_prefixes() {
    let tmp = TempDir::new().unwrap();
    // v2.0 carries the strong match; v1.0 two equal weak matches.
    write_doc(
        &docs(&tmp),
        "v2.0/c.md",
        "# Topic\n\n## Topic setup\n\n## Topic usage\n\nplain words\n",
    );
    write_doc(&docs(&tmp), "v1.0/a.md", "# Alpha\n\ntopic\n");
    write_doc(&docs(&tmp), "v1.0/b.md", "# Beta\n\ntopic\n");

    let engine = make_versioned_engine(&tmp);
    let hits = engine.search("topic", None);

    let paths: Vec<_> = hits.iter().map(|h| h.path.as_str()).collect();
    // Highest score first; the tied pair keeps its merge order
    assert_eq!(paths, vec!["v2.0/c", "v1.0/a", "v1.0/b"]);
    assert_eq!(hits[1].score, hits[2].score);
}

#[test]
fn test_search_pinned_version() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/old-feature.md", "# Widgets\n\nwidgets\n");
    write_doc(&docs(&tmp), "v2.0/new-feature.md", "# Gadgets\n\ngadgets\n");

    let engine = make_versioned_engine(&tmp);

    let hits = engine.search("widgets", Some("v1.0"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "old-feature");

    assert!(engine.search("widgets", Some("v2.0")).is_empty());
    // Unknown versions have nothing to match
    assert!(engine.search("widgets", Some("v9.9")).is_empty());
}

#[test]
fn test_navigation_per_version() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/1.intro.md", "# Intro\n");
    write_doc(&docs(&tmp), "v2.0/1.intro.md", "# Intro\n");
    write_doc(&docs(&tmp), "v2.0/2.news.md", "# News\n");

    let engine = make_versioned_engine(&tmp);
    assert_eq!(engine.navigation(Some("v1.0")).len(), 1);
    assert_eq!(engine.navigation(Some("v2.0")).len(), 2);
    // Default scope is the highest version
    assert_eq!(engine.navigation(None).len(), 2);
}

#[test]
fn test_list_versions() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "v1.0/intro.md", "# One\n");
    write_doc(&docs(&tmp), "v2.0/intro.md", "# Two\n");

    let engine = make_versioned_engine(&tmp);
    let slugs: Vec<_> = engine
        .list_versions()
        .into_iter()
        .map(|v| v.slug)
        .collect();
    assert_eq!(slugs, vec!["v2.0", "v1.0"]);
}

#[test]
fn test_clear_cache() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let engine = make_engine(&tmp);
    let _ = engine.resolve(None, "intro");
    assert!(engine.clear_cache());

    // Still resolvable after the wipe
    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(page.title, "Intro");
}

#[test]
fn test_disabled_cache_still_serves() {
    let tmp = TempDir::new().unwrap();
    write_doc(&docs(&tmp), "intro.md", "# Intro\n");

    let mut config = make_config(&tmp);
    config.cache_resolved.enabled = false;
    let engine = Engine::new(config);

    let Resolution::Page(page) = engine.resolve(None, "intro") else {
        panic!("expected page");
    };
    assert_eq!(page.title, "Intro");
    assert!(!engine.clear_cache());
}
