//! Integration tests for incremental rebuilds through `update_module`.

mod helpers;

use esmpack_bundler::{BundleOptions, Bundler};
use helpers::{assert_code_contains, assert_code_not_contains};

fn project() -> Bundler {
    Bundler::new([
        ("/index.js", "import foo from './foo.js';\nconsole.log(foo);"),
        ("/foo.js", "import { bar } from './bar.js';\nexport default bar;"),
        ("/bar.js", "export const bar = 'bar';"),
    ])
}

#[tokio::test]
async fn test_removed_import_drops_subtree() {
    let mut bundler = project();
    let before = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();
    assert_code_contains(&before, "\"/foo.js\"");
    assert_code_contains(&before, "\"/bar.js\"");

    bundler.update_module("/index.js", "console.log(1)").await.unwrap();

    for optimize in [true, false] {
        let after = bundler
            .bundle("/index.js", &BundleOptions::new().with_optimize(optimize))
            .await
            .unwrap();
        assert_code_not_contains(&after, "/foo.js");
        assert_code_not_contains(&after, "/bar.js");
        assert_code_contains(&after, "console.log(1)");
    }
}

#[tokio::test]
async fn test_updated_dependency_is_rebuilt() {
    let mut bundler = project();
    bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();

    bundler
        .update_module("/bar.js", "export const bar = 'changed';")
        .await
        .unwrap();
    let after = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();
    assert_code_contains(&after, "'changed'");
    assert_code_not_contains(&after, "'bar'");
}

#[tokio::test]
async fn test_update_can_add_new_module() {
    let mut bundler = project();
    bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();

    bundler
        .update_module("/extra.js", "window.extra = true;")
        .await
        .unwrap();
    bundler
        .update_module("/index.js", "import './extra.js';")
        .await
        .unwrap();
    let after = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap();
    assert_code_contains(&after, "window.extra = true;");
}
