//! Integration tests for build failures.
//!
//! Any error aborts the whole build; there is no partial output.

use esmpack_bundler::{BundleError, BundleOptions, Bundler, ChunkOptions};
use miette::Diagnostic;

#[tokio::test]
async fn test_missing_import_names_importer_and_specifier() {
    let mut bundler = Bundler::new([
        ("/index.js", "import './lib/a.js';"),
        ("/lib/a.js", "import { x } from '../missing.js';\nconsole.log(x);"),
    ]);
    let err = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap_err();

    match &err {
        BundleError::ModuleNotFound { importer, specifier } => {
            assert_eq!(importer, "/lib/a.js");
            assert_eq!(specifier, "../missing.js");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Cannot find module '../missing.js' imported from '/lib/a.js'"
    );
    assert_eq!(
        err.code().map(|code| code.to_string()).as_deref(),
        Some("esmpack::bundle::module_not_found")
    );
}

#[tokio::test]
async fn test_missing_dynamic_target() {
    let mut bundler = Bundler::new([("/index.js", "import('./lazy.js');")]);
    let err = bundler
        .bundle_chunks("/index.js", &ChunkOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BundleError::ModuleNotFound { ref specifier, .. } if specifier == "./lazy.js"
    ));
}

#[tokio::test]
async fn test_missing_entry() {
    let mut bundler = Bundler::new([("/index.js", "")]);
    let err = bundler.bundle("/main.js", &BundleOptions::default()).await.unwrap_err();
    assert!(matches!(
        err,
        BundleError::ModuleNotFound { ref specifier, .. } if specifier == "/main.js"
    ));
}

#[tokio::test]
async fn test_re_export_in_preserving_entry_is_unsupported() {
    let files = [
        ("/index.js", "export { x as a } from './m.js';"),
        ("/m.js", "export const x = 1;"),
    ];

    let err = Bundler::new(files)
        .bundle("/index.js", &BundleOptions::default())
        .await
        .unwrap_err();
    match &err {
        BundleError::UnsupportedSyntax { module, statement } => {
            assert_eq!(module, "/index.js");
            assert_eq!(statement, "export { x as a } from './m.js';");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.help().is_some());

    // The same entry bundles fine once exports are rewritten
    let code = Bundler::new(files)
        .bundle("/index.js", &BundleOptions::new().with_preserve_export(false))
        .await
        .unwrap();
    assert!(code.contains("_$_exports.a = _$_import(\"/m.js\").x;"));
}

#[tokio::test]
async fn test_parse_error_is_propagated() {
    let mut bundler = Bundler::new([
        ("/index.js", "import './broken.js';"),
        ("/broken.js", "const = ;"),
    ]);
    let err = bundler.bundle("/index.js", &BundleOptions::default()).await.unwrap_err();
    assert!(matches!(err, BundleError::Parse(_)), "unexpected error: {err:?}");
}

#[test]
fn test_invalid_options_are_rejected() {
    let err = BundleOptions::from_json(r#"{"optimise": true}"#).unwrap_err();
    assert!(matches!(err, BundleError::InvalidOptions(_)));
}
