//! End-to-end tests: fixture snapshot → records → stub files / JSON.
//!
//! The `game_symbols.json` fixture models a small Unity project: a `Game`
//! namespace with a class, extension methods, an enum, delegates, an interface
//! and a nested UI type, plus a global type and an unrelated `Vendor` namespace.

mod helpers;

use helpers::fixtures::{copy_fixture, fixture_path};
use helpers::{game_options, game_records, StubRun, GAME_FIXTURE};
use luastub_core::export::{stream_records, NotificationSink};
use luastub_core::model::TypeRecord;
use luastub_core::symbols::JsonSymbolSource;
use luastub_core::{find_config, load_stub_config, run, Binding, ExportMode, GenerateError};

fn record<'a>(records: &'a [TypeRecord], full_name: &str) -> &'a TypeRecord {
    records
        .iter()
        .find(|r| r.full_name() == full_name)
        .unwrap_or_else(|| panic!("no record for {full_name}"))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn test_collected_record_set() {
    let dir = tempfile::tempdir().unwrap();
    let records = game_records(&game_options(dir.path()));
    let mut names: Vec<String> = records.iter().map(TypeRecord::full_name).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Game.Color",
            "Game.Foo",
            "Game.FooExtensions",
            "Game.IDamageable",
            "Game.OnHit",
            "Game.UI.Button",
            "Game.UI.Button.Style",
            "GlobalManager",
        ],
        "internal, vendor and broken types must not appear; Foo appears once"
    );
}

#[test]
fn test_extension_merge_counts() {
    let dir = tempfile::tempdir().unwrap();
    let records = game_records(&game_options(dir.path()));
    let foo = record(&records, "Game.Foo").methods().unwrap();
    // .ctor x2, Baz, TryGet declared; Qux merged from FooExtensions.
    assert_eq!(foo.len(), 5);
    let qux = foo.last().unwrap();
    assert_eq!(qux.name, "Qux");
    assert!(!qux.is_static);
    assert_eq!(qux.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["y"]);

    let ext = record(&records, "Game.FooExtensions").methods().unwrap();
    assert!(ext.is_empty(), "extension methods never stay on their declaring type");
}

// ---------------------------------------------------------------------------
// xLua stubs
// ---------------------------------------------------------------------------

#[test]
fn test_foo_block() {
    let run = StubRun::game(|_| {});
    let stubs = run.stubs();

    assert!(stubs.starts_with("---@meta\n"));
    assert!(stubs.contains(
        "---The player avatar.\n\
         ---@source \"file:///proj/Assets/Game/Foo.cs#10:18\"\n\
         ---@class Game.Foo: UnityEngine.MonoBehaviour, Game.IDamageable\n\
         ---@overload fun(): Game.Foo\n\
         ---@overload fun(hp: integer): Game.Foo\n\
         local Foo = {}\n"
    ));
    assert!(stubs.contains("---@type integer\nFoo.Bar = nil\n"));
    assert!(stubs.contains("---@type boolean\nFoo[\"end\"] = nil\n"));
    assert!(stubs.contains("---@type number\nFoo.Health = nil\n"));
    assert!(stubs.contains(
        "---Checks x.\n\
         ---@source \"file:///proj/Assets/Game/Foo.cs#21:21\"\n\
         ---@param x number The value.\n\
         ---@return boolean\n\
         function Foo:Baz(x)\nend\n"
    ));
    assert!(stubs.contains("---@return boolean, integer\nfunction Foo.TryGet(key)\nend\n"));
    assert!(stubs.contains("---@param y string\n---@return void\nfunction Foo:Qux(y)\nend\n"));
}

#[test]
fn test_hidden_members_never_emitted() {
    let stubs = StubRun::game(|_| {}).stubs();
    let hidden = [
        "get_Health", "set_Health", "add_Died", "Hidden", "secret", ".ctor", "Vendor", "Secret",
        "Broken",
    ];
    for absent in hidden {
        assert!(!stubs.contains(absent), "{absent} leaked into stubs");
    }
    assert_eq!(stubs.matches("---@class Game.Foo").count(), 1);
}

#[test]
fn test_other_kinds() {
    let stubs = StubRun::game(|_| {}).stubs();
    assert!(stubs
        .contains("---@enum Game.Color\nlocal Color = {}\n---@type integer\nColor.Red = nil\n"));
    assert!(stubs.contains("---@alias Game.OnHit fun(target: Game.Foo): void\n"));
    assert!(stubs.contains("---@interface Game.IDamageable\nlocal IDamageable = {}\n"));
    assert!(stubs.contains("function IDamageable:TakeDamage(amount)\n"));
    assert!(stubs.contains("---@class GlobalManager\n"));
    assert!(stubs.contains("---@class Game.UI.Button.Style\n"));
    assert!(!stubs.contains("Game.UI.dll"), "metadata locations are not source links");
}

#[test]
fn test_static_class_has_no_overload() {
    let stubs = StubRun::game(|_| {}).stubs();
    let start = stubs.find("---@class Game.FooExtensions").unwrap();
    let block = &stubs[start..];
    let block = &block[..block.find("\n\n").unwrap()];
    assert!(!block.contains("@overload"));
    assert!(block.contains("local FooExtensions = {}"));
}

#[test]
fn test_namespace_file() {
    let run = StubRun::game(|_| {});
    let ns = run.read("xlua_namespace.lua");
    assert_eq!(
        ns,
        "---@meta\n\
         CS = {}\n\
         ---@type namespace <\"Game\">\nCS.Game = {}\n\
         ---@type namespace <\"Game.UI\">\nCS.Game.UI = {}\n\
         ---@type GlobalManager\nCS.GlobalManager = {}\n"
    );
}

#[test]
fn test_global_types_excluded_on_request() {
    let run = StubRun::game(|o| o.include_global = false);
    assert!(!run.stubs().contains("GlobalManager"));
    assert!(!run.read("xlua_namespace.lua").contains("GlobalManager"));
}

#[test]
fn test_runs_are_byte_identical() {
    let first = StubRun::game(|_| {});
    let second = StubRun::game(|o| o.parallel_threshold = 0);
    assert_eq!(first.stubs(), second.stubs());
    assert_eq!(first.read("xlua_namespace.lua"), second.read("xlua_namespace.lua"));
}

#[test]
fn test_small_chunks_keep_blocks_whole() {
    let whole = StubRun::game(|_| {}).stubs();
    let run = StubRun::game(|o| o.chunk_size = 200);
    let chunks = run.chunk_paths();
    assert!(chunks.len() > 3, "expected several chunk files, got {}", chunks.len());

    let mut blocks = String::new();
    for path in &chunks {
        let text = std::fs::read_to_string(path).unwrap();
        let body = text.strip_prefix("---@meta\n").expect("chunk without meta header");
        blocks.push_str(body);
    }
    assert_eq!(format!("---@meta\n{blocks}"), whole);
}

// ---------------------------------------------------------------------------
// Other bindings and delivery modes
// ---------------------------------------------------------------------------

#[test]
fn test_no_binding_and_tolua_write_nothing() {
    for binding in [Binding::None, Binding::ToLua] {
        let run = StubRun::game(|o| o.binding = binding);
        assert!(run.summary.files.is_empty(), "{binding} wrote files");
        assert_eq!(run.summary.records, 8);
    }
}

#[test]
fn test_json_document() {
    let run = StubRun::game(|o| o.export = ExportMode::Json);
    let doc: serde_json::Value = serde_json::from_str(&run.read("api.json")).unwrap();
    assert_eq!(doc["root"], "CS");
    let classes = doc["classes"].as_array().unwrap();
    assert_eq!(classes.len(), 8);

    let foo = classes.iter().find(|c| c["name"] == "Foo").unwrap();
    assert_eq!(foo["kind"], "class");
    assert_eq!(foo["baseClass"], "UnityEngine.MonoBehaviour");
    let baz = foo["methods"].as_array().unwrap().iter().find(|m| m["name"] == "Baz").unwrap();
    let comment = baz["comment"].as_str().unwrap();
    assert!(comment.starts_with("Checks x.\n\n```plaintext\nParams: x - The value.\n```"));
    assert!(comment.ends_with("Returns: True when valid.\n```"));
}

#[test]
fn test_stream_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = game_options(dir.path());
    options.export = ExportMode::Stream;
    let records = game_records(&options);

    let mut sink = NotificationSink::new(Vec::new());
    let sent = stream_records(&mut sink, &records).unwrap();
    assert_eq!(sent, 8);

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let methods: Vec<String> = text
        .lines()
        .map(|l| {
            let message: serde_json::Value = serde_json::from_str(l).unwrap();
            message["method"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(methods.first().map(String::as_str), Some("api/begin"));
    assert_eq!(methods.last().map(String::as_str), Some("api/finish"));
    assert_eq!(methods.iter().filter(|m| *m == "api/add").count(), 8);
}

// ---------------------------------------------------------------------------
// Snapshot files, config and failures
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_file_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = copy_fixture(GAME_FIXTURE, dir.path());
    std::fs::write(
        dir.path().join("luastub.toml"),
        "namespaces = \"Game.UI\"\ninclude_global = false\noutput = \"ignored\"\n",
    )
    .unwrap();

    let config = find_config(&snapshot).expect("config next to snapshot");
    let mut options = load_stub_config(&config);
    options.output = dir.path().join("stubs");

    let summary = run(&JsonSymbolSource::new(&snapshot), &options).unwrap();
    assert_eq!(summary.records, 2);
    let stubs = std::fs::read_to_string(dir.path().join("stubs/xlua_dump_0.lua")).unwrap();
    assert!(stubs.contains("---@class Game.UI.Button\n"));
    assert!(!stubs.contains("Game.Foo"));
}

#[test]
fn test_missing_and_malformed_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let options = game_options(dir.path());

    let missing = run(&JsonSymbolSource::new(dir.path().join("nope.json")), &options);
    assert!(matches!(missing, Err(GenerateError::ReadSnapshot { .. })));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ \"compilations\": [ { ").unwrap();
    let malformed = run(&JsonSymbolSource::new(&bad), &options);
    assert!(matches!(malformed, Err(GenerateError::ParseSnapshot { .. })));
}

#[test]
fn test_zero_chunk_size_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = game_options(dir.path());
    options.chunk_size = 0;
    let result = run(&JsonSymbolSource::new(fixture_path(GAME_FIXTURE)), &options);
    assert!(matches!(result, Err(GenerateError::InvalidOption(_))));
}
