//! Integration tests for graph loading from disk.

use std::fs;
use std::path::Path;

use esmpack_graph::runtime::NativeRuntime;
use esmpack_graph::{EdgeKind, GraphError, ImportMap, Imported, ModuleGraph, ModuleId, ModuleLoader};
use tempfile::TempDir;

fn write(dir: &Path, path: &str, content: &str) {
    let full = dir.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn id(path: &str) -> ModuleId {
    ModuleId::new(path).unwrap()
}

#[tokio::test]
async fn test_loads_project_with_import_map() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "index.js",
        "import { h } from 'ui';\nimport { util } from 'lib/util.js';\nimport 'https://cdn.example.com/x.js';\nh(util);",
    );
    write(dir.path(), "vendor/ui.js", "export const h = (x) => x;");
    write(dir.path(), "src/lib/util.js", "export const util = 1;");

    let runtime = NativeRuntime::new(dir.path());
    let import_map = ImportMap::new()
        .with_import("ui", "/vendor/ui.js")
        .with_import("lib/", "/src/lib/");
    let mut graph = ModuleGraph::new();
    let order = ModuleLoader::new(&runtime, &import_map)
        .load(&id("/index.js"), &mut graph)
        .await
        .unwrap();

    let order: Vec<&str> = order.iter().map(ModuleId::as_str).collect();
    assert_eq!(order, ["/index.js", "/vendor/ui.js", "/src/lib/util.js"]);

    let index = graph.get("/index.js").unwrap();
    // External URLs are never loaded or recorded as edges
    assert_eq!(index.imports.len(), 2);
    assert_eq!(index.imports[0].kind, EdgeKind::Import);
    assert_eq!(index.imports[0].specifiers[0].imported, Imported::Name("h".into()));
    assert!(index.imports[0].specifiers[0].used);
    assert!(!index.pure);
    assert!(graph.get("/vendor/ui.js").unwrap().pure);
}

#[tokio::test]
async fn test_missing_file_on_disk() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "index.js", "import './nope.js';");

    let runtime = NativeRuntime::new(dir.path());
    let import_map = ImportMap::default();
    let mut graph = ModuleGraph::new();
    let err = ModuleLoader::new(&runtime, &import_map)
        .load(&id("/index.js"), &mut graph)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::ModuleNotFound { ref importer, ref specifier }
            if importer == "/index.js" && specifier == "./nope.js"
    ));
}

#[tokio::test]
async fn test_reload_writes_file_and_reanalyzes() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "index.js", "import './a.js';");
    write(dir.path(), "a.js", "");

    let runtime = NativeRuntime::new(dir.path());
    let import_map = ImportMap::default();
    let mut graph = ModuleGraph::new();
    let loader = ModuleLoader::new(&runtime, &import_map);
    loader.load(&id("/index.js"), &mut graph).await.unwrap();

    loader
        .reload(&id("/index.js"), "import './b.js';", &mut graph)
        .await
        .unwrap_err();

    write(dir.path(), "b.js", "export const b = 1;");
    loader
        .reload(&id("/index.js"), "import { b } from './b.js';\nconsole.log(b);", &mut graph)
        .await
        .unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("index.js")).unwrap(),
        "import { b } from './b.js';\nconsole.log(b);"
    );
    assert!(graph.contains("/b.js"));
    assert_eq!(graph.reachable("/index.js").len(), 2);
}
