//! Integration tests for tree shaking.
//!
//! These tests cover the two optimization passes end to end:
//! - Dead exports removed from pure modules
//! - Dead imports dropped when the target has no side effects
//! - Side-effectful modules always kept
//! - `optimize: false` leaving every static import in place

mod helpers;

use esmpack_bundler::{BundleOptions, Bundler};
use helpers::{assert_code_contains, assert_code_not_contains, bundle_files};

#[tokio::test]
async fn test_drops_unused_modules_and_exports() {
    let code = bundle_files(
        &[
            (
                "/index.js",
                "import './a.js';\nimport b from './b.js';\nimport { c } from './c.js';\nconsole.log(c);",
            ),
            ("/a.js", "console.log(1)"),
            ("/b.js", "export default 1;"),
            ("/c.js", "export const c = 1;\nexport const deadcode = 2;"),
        ],
        "/index.js",
        BundleOptions::default(),
    )
    .await;

    assert_code_contains(&code, "\"/a.js\"");
    assert_code_contains(&code, "console.log(1)");
    assert_code_contains(&code, "\"/c.js\"");
    assert_code_not_contains(&code, "/b.js");
    assert_code_not_contains(&code, "deadcode");
}

#[tokio::test]
async fn test_drops_unused_import() {
    let code = bundle_files(
        &[
            ("/index.js", "import foo from './foo.js';\nconsole.log('hi');"),
            ("/foo.js", "export default 'foo';"),
        ],
        "/index.js",
        BundleOptions::default(),
    )
    .await;

    assert_code_not_contains(&code, "/foo.js");
    assert_code_contains(&code, "console.log('hi');");
}

#[tokio::test]
async fn test_keeps_unused_import_with_side_effects_below() {
    let code = bundle_files(
        &[
            ("/index.js", "import { x } from './x.js';\nconsole.log('hi');"),
            ("/x.js", "import './effect.js';\nexport const x = 1;"),
            ("/effect.js", "window.loaded = true;"),
        ],
        "/index.js",
        BundleOptions::default(),
    )
    .await;

    assert_code_contains(&code, "\"/x.js\"");
    assert_code_contains(&code, "window.loaded = true;");
}

#[tokio::test]
async fn test_keeps_impure_export() {
    let code = bundle_files(
        &[
            ("/index.js", "import { a } from './m.js';\nconsole.log(a);"),
            ("/m.js", "export const a = 1;\nexport const b = fetch('/api');"),
        ],
        "/index.js",
        BundleOptions::default(),
    )
    .await;

    assert_code_contains(&code, "fetch('/api')");
}

#[tokio::test]
async fn test_optimize_false_keeps_everything() {
    let code = bundle_files(
        &[
            ("/index.js", "import foo from './foo.js';\nconsole.log('hi');"),
            ("/foo.js", "export default 'foo';\nexport const unused = 1;"),
        ],
        "/index.js",
        BundleOptions::new().with_optimize(false),
    )
    .await;

    assert_code_contains(&code, "\"/foo.js\"");
    assert_code_contains(&code, "unused");
}

#[tokio::test]
async fn test_shaking_does_not_touch_the_cache() {
    let mut bundler = Bundler::new([
        ("/index.js", "import { c } from './c.js';\nconsole.log(c);"),
        ("/c.js", "export const c = 1;\nexport const deadcode = 2;"),
    ]);

    let shaken = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();
    assert_code_not_contains(&shaken, "deadcode");

    let cached = bundler.graph().get("/c.js").unwrap();
    assert!(cached.source.contains("deadcode"));

    let full = bundler
        .bundle("/index.js", &BundleOptions::new().with_optimize(false))
        .await
        .unwrap();
    assert_code_contains(&full, "deadcode");
}
