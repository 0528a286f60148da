//! Go rendering of structural types
//!
//! Types declared next to the service interface are written unqualified in
//! the source; generated files live in other packages, so such names get the
//! service package qualifier. Import-qualified types keep their own package.

use ir::{Parameter, TypeRef};

use crate::go_file::GoFile;
use crate::utils::is_builtin_type;

/// Renders [`TypeRef`]s into a [`GoFile`], importing packages as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRenderer<'a> {
    service_import: Option<&'a str>,
}

impl<'a> TypeRenderer<'a> {
    /// Renderer for code inside the service package itself
    pub fn local() -> Self { Self { service_import: None } }

    /// Renderer qualifying service-declared names with `service_import`
    pub fn qualified(service_import: &'a str) -> Self {
        Self { service_import: Some(service_import) }
    }

    /// Go syntax for `ty`
    pub fn render(&self, ty: &TypeRef, file: &mut GoFile) -> String {
        self.render_inner(ty, file, false)
    }

    /// `name Type, name Type` for a parameter list
    pub fn params(&self, params: &[Parameter], file: &mut GoFile) -> String {
        params
            .iter()
            .map(|p| self.param(p, file))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Result list: bare when one unnamed result, parenthesized otherwise
    pub fn results(&self, results: &[Parameter], file: &mut GoFile) -> String {
        match results {
            [] => String::new(),
            [single] if single.name.is_empty() => self.render(&single.ty, file),
            _ => format!("({})", self.params(results, file)),
        }
    }

    /// Argument names, with `...` after a variadic last one
    pub fn call_args(&self, params: &[Parameter]) -> String {
        params
            .iter()
            .map(|p| match &p.ty {
                TypeRef::Array { len: ir::ArrayLen::Ellipsis, .. } => format!("{}...", p.name),
                _ => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Type of a struct field holding parameter `ty`; variadics become slices
    pub fn field_type(&self, ty: &TypeRef, file: &mut GoFile) -> String {
        match ty {
            TypeRef::Array { len: ir::ArrayLen::Ellipsis, next } => {
                format!("[]{}", self.render(next, file))
            }
            other => self.render(other, file),
        }
    }

    fn param(&self, p: &Parameter, file: &mut GoFile) -> String {
        let ty = self.render(&p.ty, file);
        if p.name.is_empty() {
            ty
        } else {
            format!("{} {}", p.name, ty)
        }
    }

    fn render_inner(&self, ty: &TypeRef, file: &mut GoFile, qualified: bool) -> String {
        match ty {
            TypeRef::Name { name } => match self.service_import {
                Some(import) if !qualified && !is_builtin_type(name) => file.qual(import, name),
                _ => name.clone(),
            },
            TypeRef::Pointer { depth, next } => {
                format!("{}{}", "*".repeat(*depth), self.render_inner(next, file, qualified))
            }
            TypeRef::Array { len, next } => {
                format!("{}{}", len, self.render_inner(next, file, qualified))
            }
            TypeRef::Map { key, value } => format!(
                "map[{}]{}",
                self.render_inner(key, file, false),
                self.render_inner(value, file, false)
            ),
            TypeRef::Interface { methods } if methods.is_empty() => "interface{}".to_string(),
            TypeRef::Interface { methods } => {
                let methods = methods
                    .iter()
                    .map(|m| {
                        let args = self.params(&m.args, file);
                        let results = self.results(&m.results, file);
                        format!("{}({}) {}", m.name, args, results).trim_end().to_string()
                    })
                    .collect::<Vec<_>>();
                format!("interface{{ {} }}", methods.join("; "))
            }
            TypeRef::Struct { fields } if fields.is_empty() => "struct{}".to_string(),
            TypeRef::Struct { fields } => {
                let fields = fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, self.render(&f.ty, file)))
                    .collect::<Vec<_>>();
                format!("struct{{ {} }}", fields.join("; "))
            }
            TypeRef::Func { args, results } => {
                let args = self.params(args, file);
                let results = self.results(results, file);
                format!("func({}) {}", args, results).trim_end().to_string()
            }
            TypeRef::Import { package, alias, next } => {
                let local = match alias {
                    Some(alias) => file.import_as(package, alias),
                    None => file.import(package),
                };
                format!("{}.{}", local, self.render_inner(next, file, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_names_get_service_qualifier() {
        let mut file = GoFile::new("transport");
        let renderer = TypeRenderer::qualified("github.com/acme/stringsvc");
        let ty = TypeRef::slice(TypeRef::pointer(TypeRef::named("Comment")));
        assert_eq!(renderer.render(&ty, &mut file), "[]*stringsvc.Comment");
        let map = TypeRef::map(TypeRef::named("string"), TypeRef::named("int"));
        assert_eq!(renderer.render(&map, &mut file), "map[string]int");
    }

    #[test]
    fn imported_names_keep_their_package() {
        let mut file = GoFile::new("service");
        let renderer = TypeRenderer::local();
        assert_eq!(renderer.render(&TypeRef::context(), &mut file), "context.Context");
        let aliased = TypeRef::Import {
            package: "github.com/go-kit/log".into(),
            alias: Some("kitlog".into()),
            next: Box::new(TypeRef::named("Logger")),
        };
        assert_eq!(renderer.render(&aliased, &mut file), "kitlog.Logger");
        assert_eq!(file.imports().count(), 2);
    }

    #[test]
    fn signatures_render_like_go() {
        let mut file = GoFile::new("service");
        let renderer = TypeRenderer::local();
        let params = vec![
            Parameter::new("ctx", TypeRef::context()),
            Parameter::new("ids", TypeRef::Array {
                len: ir::ArrayLen::Ellipsis,
                next: Box::new(TypeRef::named("int")),
            }),
        ];
        assert_eq!(renderer.params(&params, &mut file), "ctx context.Context, ids ...int");
        assert_eq!(renderer.call_args(&params), "ctx, ids...");
        assert_eq!(renderer.field_type(&params[1].ty, &mut file), "[]int");
        let unnamed = vec![Parameter::new("", TypeRef::error())];
        assert_eq!(renderer.results(&unnamed, &mut file), "error");
    }
}
