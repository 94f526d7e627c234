//! Output assembly
//!
//! Every output unit renders to one script: a header comment, the runtime
//! prelude, the registry table of module factories, optional global
//! exposure of the import function, and finally the root module's code.
//!
//! ```text
//! // esmpack generate
//! const _$_exported = {};
//! const _$_import = (id) => _$_exported[id] || _$_modules[id](_$_exported[id] = {});
//! const _$_modules = {"/foo.js": (_$_exports) => {...
//! return _$_exports}};
//!
//! // -- entry --
//!
//! ...
//! ```

use esmpack_gen::{property_access, quote};
use esmpack_graph::{ImportMap, ModuleGraph};

use crate::chunk::{ChunkUrls, OutputUnit};
use crate::error::{BundleError, Result};
use crate::transform::{
    EXPORTED_CACHE, EXPORTS_OBJ, ExternalImports, IMPORT_FN, MODULES_TABLE, Mode, TransformOptions,
    transform,
};

/// First line of every rendered unit
pub const HEADER: &str = "// esmpack generate";
/// Separates the runtime from the root module's code
pub const ENTRY_MARKER: &str = "// -- entry --";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Expose the import function as `globalThis.<name>.import`
    pub expose_to_global: Option<&'a str>,
    /// Keep native `export` syntax in the root module
    pub preserve_export: bool,
    pub preserve_external_import: bool,
    /// Set for split output
    pub chunk_urls: Option<&'a ChunkUrls>,
}

/// Render one output unit
pub fn render_unit(
    graph: &ModuleGraph,
    unit: &OutputUnit,
    import_map: &ImportMap,
    options: &RenderOptions<'_>,
) -> Result<String> {
    let module_options = TransformOptions {
        mode: Mode::Module,
        preserve_external_import: options.preserve_external_import,
        chunk_urls: options.chunk_urls,
    };

    let mut externals = ExternalImports::new();
    let mut factories = Vec::with_capacity(unit.dependencies().len());
    for id in unit.dependencies() {
        let record = graph
            .get(id.as_str())
            .ok_or_else(|| BundleError::missing_record(id.as_str()))?;
        let transformed = transform(record, import_map, &module_options, &mut externals)?;
        factories.push(format!(
            "{}: ({EXPORTS_OBJ}) => {{{}\nreturn {EXPORTS_OBJ}}}",
            quote(id.as_str()),
            transformed.code
        ));
    }

    let root = graph
        .get(unit.root.as_str())
        .ok_or_else(|| BundleError::missing_record(unit.root.as_str()))?;
    let entry = transform(
        root,
        import_map,
        &TransformOptions {
            mode: Mode::Entry {
                preserve_export: options.preserve_export,
            },
            preserve_external_import: options.preserve_external_import,
            chunk_urls: options.chunk_urls,
        },
        &mut externals,
    )?;

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for declaration in externals.declarations() {
        out.push_str(&declaration);
        out.push('\n');
    }
    out.push_str(&format!("const {EXPORTED_CACHE} = {{}};\n"));
    out.push_str(&format!(
        "const {IMPORT_FN} = (id) => {EXPORTED_CACHE}[id] || {MODULES_TABLE}[id]({EXPORTED_CACHE}[id] = {{}});\n"
    ));
    out.push_str(&format!("const {MODULES_TABLE} = {{{}}};\n", factories.join(",\n")));
    if let Some(name) = options.expose_to_global {
        out.push_str(&format!(
            "/* Expose import */ {} = {{import: {IMPORT_FN}}};\n",
            property_access("globalThis", name)
        ));
    }
    out.push('\n');
    out.push_str(ENTRY_MARKER);
    out.push_str("\n\n");
    out.push_str(&entry.code);
    out.push('\n');

    tracing::debug!(
        root = %unit.root,
        modules = unit.modules.len(),
        bytes = out.len(),
        "rendered unit"
    );
    Ok(out)
}
