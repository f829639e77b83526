//! Resolver behaviour over real directory trees
//!
//! Sources are scripted through the mock loader; locations are real
//! `.flagconf` files in a temp dir so discovery runs against the filesystem.

use flagconf::host::{CONFIRM_CONF_VAR, GLOBAL_CONF_VAR};
use flagconf::mock::{MockLoader, MockSource, RecordingHost};
use flagconf::resolver::no_conf_message;
use flagconf::{Flags, FlagsError, FlagsResult, FrontEnd, RegistryEntry, CONF_FILENAME};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create `<root>/<dir>/.flagconf` and return its path.
fn write_conf(root: &Path, dir: &str) -> PathBuf {
    let conf = root.join(dir).join(CONF_FILENAME);
    fs::create_dir_all(conf.parent().unwrap()).unwrap();
    fs::write(&conf, "").unwrap();
    conf
}

fn frontend() -> FrontEnd {
    FrontEnd::new("/opt/frontend")
}

fn with_special(flags: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
    out.extend(frontend().special_includes());
    out
}

// =============================================================================
// Test 1: siblings share one load and one confirmation
// =============================================================================

#[test]
fn test_shared_ancestor_loaded_and_confirmed_once() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(&conf, MockSource::with_flags(&["-DFOO"]));
    let host = RecordingHost::new().answering(true);
    let mut flags = Flags::new(host, loader, frontend());

    let a = tmp.path().join("proj/src/a.c");
    let b = tmp.path().join("proj/lib/deep/b.c");

    assert_eq!(flags.resolve(&a).unwrap().unwrap().as_slice(), with_special(&["-DFOO"]));
    assert_eq!(flags.resolve(&b).unwrap().unwrap().as_slice(), with_special(&["-DFOO"]));

    assert_eq!(flags.loader().load_count(&conf), 1);
    assert_eq!(flags.host().prompts().len(), 1);
    assert_eq!(flags.bound_unit(&a), flags.bound_unit(&b));
    assert_eq!(flags.bound_location(&a), Some(conf.as_path()));
}

#[test]
fn test_nearest_source_wins() {
    let tmp = TempDir::new().unwrap();
    let outer = write_conf(tmp.path(), "proj");
    let inner = write_conf(tmp.path(), "proj/sub");
    let loader = MockLoader::new()
        .with_source(&outer, MockSource::with_flags(&["-DOUTER"]))
        .with_source(&inner, MockSource::with_flags(&["-DINNER"]));
    let host = RecordingHost::new().with_variable(CONFIRM_CONF_VAR, json!(false));
    let mut flags = Flags::new(host, loader, frontend());

    let file = tmp.path().join("proj/sub/x.cpp");
    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-DINNER"]));
    assert_eq!(flags.loader().load_count(&outer), 0);
}

// =============================================================================
// Test 2: caching directives
// =============================================================================

#[test]
fn test_not_ready_is_never_cached() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(
        &conf,
        MockSource::with_responses(vec![
            FlagsResult::not_ready(),
            FlagsResult::not_ready(),
            FlagsResult::new(vec!["-O2".to_string()]),
        ]),
    );
    let host = RecordingHost::new().with_variable(CONFIRM_CONF_VAR, json!(false));
    let mut flags = Flags::new(host, loader, frontend());
    let file = tmp.path().join("proj/a.c");

    assert_eq!(flags.resolve(&file).unwrap(), None);
    assert!(flags.cached_flags(&file).is_none());
    assert_eq!(flags.resolve(&file).unwrap(), None);
    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-O2"]));
    assert!(flags.cached_flags(&file).is_some());

    // Cached now: a fourth call does not reach the source.
    flags.resolve(&file).unwrap();
    assert_eq!(flags.loader().query_count(&conf), 3);
    assert_eq!(flags.loader().load_count(&conf), 1);
    // Not ready is not the same as no source.
    assert!(!flags.no_conf_warning_posted());
}

#[test]
fn test_uncached_results_requery_every_time() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(
        &conf,
        MockSource::with_responses(vec![
            FlagsResult::uncached(vec!["-DGEN=1".to_string()]),
            FlagsResult::uncached(vec!["-DGEN=2".to_string()]),
        ]),
    );
    let host = RecordingHost::new().with_variable(CONFIRM_CONF_VAR, json!(false));
    let mut flags = Flags::new(host, loader, frontend());
    let file = tmp.path().join("proj/a.c");

    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-DGEN=1"]));
    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-DGEN=2"]));
    assert!(flags.cached_flags(&file).is_none());
    assert_eq!(flags.loader().query_count(&conf), 2);
    assert_eq!(flags.loader().load_count(&conf), 1);
}

// =============================================================================
// Test 3: no usable source
// =============================================================================

#[test]
fn test_no_conf_notice_posted_once() {
    let tmp = TempDir::new().unwrap();
    let mut flags = Flags::new(RecordingHost::new(), MockLoader::new(), frontend());

    assert_eq!(flags.resolve(&tmp.path().join("a.c")).unwrap(), None);
    assert_eq!(flags.resolve(&tmp.path().join("b/c.c")).unwrap(), None);
    assert_eq!(flags.resolve(&tmp.path().join("a.c")).unwrap(), None);

    assert_eq!(flags.host().messages(), &[no_conf_message()]);
    assert!(flags.host().prompts().is_empty());
    assert_eq!(flags.loader().total_loads(), 0);
}

#[test]
fn test_declined_source_stays_declined() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(&conf, MockSource::with_flags(&["-DFOO"]));
    let host = RecordingHost::new().answering(false);
    let mut flags = Flags::new(host, loader, frontend());

    assert_eq!(flags.resolve(&tmp.path().join("proj/a.c")).unwrap(), None);
    assert_eq!(flags.resolve(&tmp.path().join("proj/sub/b.c")).unwrap(), None);

    assert_eq!(flags.registry_entry(&conf), Some(RegistryEntry::Declined));
    assert_eq!(flags.host().prompts(), &[format!("Found {}. Load?", conf.display())]);
    assert_eq!(flags.host().messages().len(), 1);
    assert_eq!(flags.loader().load_count(&conf), 0);
}

#[test]
fn test_declined_nearest_falls_back_to_outer() {
    let tmp = TempDir::new().unwrap();
    let outer = write_conf(tmp.path(), "proj");
    let inner = write_conf(tmp.path(), "proj/vendored");
    let loader = MockLoader::new()
        .with_source(&outer, MockSource::with_flags(&["-DOUTER"]))
        .with_source(&inner, MockSource::with_flags(&["-DINNER"]));
    // Decline the inner prompt, accept the outer one.
    let host = RecordingHost::new().with_answers([false, true]);
    let mut flags = Flags::new(host, loader, frontend());

    let file = tmp.path().join("proj/vendored/lib.c");
    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-DOUTER"]));
    assert_eq!(flags.bound_location(&file), Some(outer.as_path()));
    assert_eq!(flags.loader().load_count(&inner), 0);
}

// =============================================================================
// Test 4: global fallback
// =============================================================================

#[test]
fn test_global_source_is_trusted() {
    let tmp = TempDir::new().unwrap();
    let global = write_conf(tmp.path(), "home");
    fs::create_dir_all(tmp.path().join("elsewhere")).unwrap();
    let loader = MockLoader::new().with_source(&global, MockSource::with_flags(&["-DGLOBAL"]));
    let host = RecordingHost::new()
        .with_variable(GLOBAL_CONF_VAR, json!(global.display().to_string()))
        .answering(false);
    let mut flags = Flags::new(host, loader, frontend());

    let file = tmp.path().join("elsewhere/a.c");
    assert_eq!(flags.resolve(&file).unwrap().unwrap().as_slice(), with_special(&["-DGLOBAL"]));
    assert!(flags.host().prompts().is_empty());
    assert!(flags.host().messages().is_empty());
    assert_eq!(flags.global_conf(), Some(global.as_path()));
}

#[test]
fn test_global_source_trusted_when_found_as_ancestor() {
    let tmp = TempDir::new().unwrap();
    let global = write_conf(tmp.path(), "home");
    let loader = MockLoader::new().with_source(&global, MockSource::with_flags(&["-DGLOBAL"]));
    let host = RecordingHost::new()
        .with_variable(GLOBAL_CONF_VAR, json!(global.display().to_string()))
        .answering(false);
    let mut flags = Flags::new(host, loader, frontend());

    let file = tmp.path().join("home/code/a.c");
    assert!(flags.resolve(&file).unwrap().is_some());
    assert!(flags.host().prompts().is_empty());
    assert_eq!(flags.loader().load_count(&global), 1);
}

/// `path` spelled relative to the current directory.
#[cfg(unix)]
fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut rel = PathBuf::new();
    for _ in cwd.components().skip(1) {
        rel.push("..");
    }
    rel.join(path.strip_prefix("/").unwrap())
}

#[cfg(unix)]
#[test]
fn test_relative_global_source_is_one_trusted_location() {
    let tmp = TempDir::new().unwrap();
    let global = write_conf(tmp.path(), "home");
    let loader = MockLoader::new().with_source(&global, MockSource::with_flags(&["-DGLOBAL"]));
    let relative = relative_to_cwd(&global);
    assert!(relative.is_relative());
    let host = RecordingHost::new()
        .with_variable(GLOBAL_CONF_VAR, json!(relative.display().to_string()))
        .answering(false);
    let mut flags = Flags::new(host, loader, frontend());

    assert_eq!(flags.global_conf(), Some(global.as_path()));

    // Inside the global's directory the walk finds it as an ancestor.
    let inside = tmp.path().join("home/a.c");
    assert!(flags.resolve(&inside).unwrap().is_some());
    // Elsewhere it is reached as the fallback.
    let outside = tmp.path().join("other/b.c");
    assert!(flags.resolve(&outside).unwrap().is_some());

    assert!(flags.host().prompts().is_empty());
    assert_eq!(flags.loaded_count(), 1);
    assert_eq!(flags.loader().load_count(&global), 1);
    assert_eq!(flags.bound_location(&outside), Some(global.as_path()));
}

#[test]
fn test_missing_global_source_ignored() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope").join(CONF_FILENAME);
    let host = RecordingHost::new()
        .with_variable(GLOBAL_CONF_VAR, json!(missing.display().to_string()));
    let mut flags = Flags::new(host, MockLoader::new(), frontend());

    assert_eq!(flags.resolve(&tmp.path().join("a.c")).unwrap(), None);
    assert!(flags.no_conf_warning_posted());
    assert_eq!(flags.loader().total_loads(), 0);
}

// =============================================================================
// Test 5: failures
// =============================================================================

#[test]
fn test_failed_load_is_retried() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(&conf, MockSource::failing_load("syntax error"));
    let host = RecordingHost::new().with_variable(CONFIRM_CONF_VAR, json!(false));
    let mut flags = Flags::new(host, loader, frontend());

    let err = flags.resolve(&tmp.path().join("proj/a.c")).unwrap_err();
    assert!(matches!(err, FlagsError::Load { ref location, .. } if location == &conf));
    assert_eq!(flags.registry_entry(&conf), None);
    assert_eq!(flags.loaded_count(), 0);

    flags
        .loader_mut()
        .set_source(&conf, MockSource::with_flags(&["-DFIXED"]));
    let fixed = flags.resolve(&tmp.path().join("proj/b.c")).unwrap().unwrap();
    assert_eq!(fixed.as_slice(), with_special(&["-DFIXED"]));
    assert_eq!(flags.loader().load_count(&conf), 2);
    assert!(!flags.no_conf_warning_posted());
}

#[test]
fn test_source_flags_are_sanitized() {
    let tmp = TempDir::new().unwrap();
    let conf = write_conf(tmp.path(), "proj");
    let loader = MockLoader::new().with_source(
        &conf,
        MockSource::with_flags(&["-arch", "x86_64", "-archfoo", "-Wall"]),
    );
    let host = RecordingHost::new().with_variable(CONFIRM_CONF_VAR, json!(false));
    let mut flags = Flags::new(host, loader, frontend());

    let result = flags.resolve(&tmp.path().join("proj/a.m")).unwrap().unwrap();
    assert_eq!(result.as_slice(), with_special(&["-Wall"]));
}
