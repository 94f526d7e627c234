//! Shared test utilities for esmpack-bundler tests

#![allow(dead_code)]

use boa_engine::{Context, JsValue, Source};
use esmpack_bundler::{BundleOptions, Bundler};

/// Bundle `entry` from an in-memory file set with the given options
pub async fn bundle_files(files: &[(&str, &str)], entry: &str, options: BundleOptions) -> String {
    Bundler::new(files.iter().copied())
        .bundle(entry, &options)
        .await
        .expect("bundle should succeed")
}

/// Evaluate `code` as a script, then evaluate `expr` in the same realm
pub fn eval_then(code: &str, expr: &str) -> JsValue {
    let mut context = Context::default();
    context
        .eval(Source::from_bytes(code))
        .unwrap_or_else(|err| panic!("bundle failed to run: {err}\n{code}"));
    context
        .eval(Source::from_bytes(expr))
        .unwrap_or_else(|err| panic!("failed to evaluate `{expr}`: {err}"))
}

/// Drop native `export` keywords so an export-preserving bundle runs as a script
pub fn strip_native_exports(code: &str) -> String {
    code.lines()
        .filter(|line| !line.trim_start().starts_with("export {"))
        .collect::<Vec<_>>()
        .join("\n")
        .replace("export default ", "")
        .replace("export function ", "function ")
        .replace("export const ", "const ")
        .replace("export class ", "class ")
}

/// Evaluate `code` and read `globalThis.__out` as a string
pub fn eval_out_string(code: &str) -> String {
    let value = eval_then(code, "globalThis.__out");
    value
        .as_string()
        .map(|s| s.to_std_string_escaped())
        .unwrap_or_else(|| panic!("__out is not a string: {}", value.display()))
}

/// Evaluate `code` and read `globalThis.__out` as a number
pub fn eval_out_number(code: &str) -> f64 {
    let value = eval_then(code, "globalThis.__out");
    value
        .as_number()
        .unwrap_or_else(|| panic!("__out is not a number: {}", value.display()))
}

pub fn assert_code_contains(code: &str, substring: &str) {
    assert!(
        code.contains(substring),
        "Expected code to contain '{}', but it didn't.\nCode:\n{}",
        substring,
        code
    );
}

pub fn assert_code_not_contains(code: &str, substring: &str) {
    assert!(
        !code.contains(substring),
        "Expected code NOT to contain '{}', but it did.\nCode:\n{}",
        substring,
        code
    );
}
