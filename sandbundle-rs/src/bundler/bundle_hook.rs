//! `import.meta` rewriting for bundled modules.

use deno_ast::swc::ast::{Expr, KeyValueProp, Lit, PropName, Str};
use deno_ast::swc::bundler::{Hook, ModuleRecord};
use deno_ast::swc::common::Span;

/// `import.meta.url` becomes the module's sandbox id (`virtual:/App.js`,
/// `shim:react`, `empty:./x (from /App.js)`). Sandboxed modules have no other
/// meta properties, so nothing else is provided.
pub struct BundleHook;

impl Hook for BundleHook {
    fn get_import_meta_props(
        &self,
        span: Span,
        module_record: &ModuleRecord,
    ) -> Result<Vec<KeyValueProp>, anyhow::Error> {
        Ok(vec![KeyValueProp {
            key: PropName::Ident("url".into()),
            value: Box::new(Expr::Lit(Lit::Str(Str {
                span,
                value: module_record.file_name.to_string().into(),
                raw: None,
            }))),
        }])
    }
}
