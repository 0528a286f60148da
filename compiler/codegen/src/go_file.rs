//! Buffer for one generated Go file
//!
//! Renderers write the body through [`std::fmt::Write`] and ask for package
//! qualifiers through [`GoFile::import`]; the import block is assembled from
//! whatever was requested when the file is rendered.

use std::collections::BTreeMap;
use std::fmt;

use ir::package_name;

use crate::utils::sanitize_package_name;
use crate::GENERATOR_VERSION;

/// One Go source file under construction
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    package: String,
    header: Option<String>,
    /// import path -> local name
    imports: BTreeMap<String, String>,
    /// import path -> name to use once the path is imported
    preferred: BTreeMap<String, String>,
    body: String,
}

impl GoFile {
    /// Start a file in package `package` with the standard generated-code header
    pub fn new(package: impl Into<String>) -> Self {
        Self { package: package.into(), header: Some(generated_header()), ..Self::default() }
    }

    /// Start a file without the generated-code header, for scaffolds meant to be edited
    pub fn editable(package: impl Into<String>) -> Self {
        Self { package: package.into(), ..Self::default() }
    }

    /// Use `alias` for `path` if the path is ever imported
    pub fn with_alias(mut self, path: &str, alias: &str) -> Self {
        self.preferred.insert(path.to_string(), sanitize_package_name(alias));
        self
    }

    /// Package clause of the file
    pub fn package(&self) -> &str { &self.package }

    /// Local name to qualify identifiers from `path`, importing it on first use
    ///
    /// The name is the sanitized last path segment; when another import
    /// already owns it a numeric suffix is added (`grpc`, `grpc1`, ...).
    pub fn import(&mut self, path: &str) -> String {
        if let Some(name) = self.imports.get(path) {
            return name.clone();
        }
        let base = match self.preferred.get(path) {
            Some(alias) => alias.clone(),
            None => sanitize_package_name(package_name(path)),
        };
        let name = self.free_name(&base);
        self.imports.insert(path.to_string(), name.clone());
        name
    }

    /// Like [`GoFile::import`] but preferring `alias` as the local name
    pub fn import_as(&mut self, path: &str, alias: &str) -> String {
        if let Some(name) = self.imports.get(path) {
            return name.clone();
        }
        let name = self.free_name(alias);
        self.imports.insert(path.to_string(), name.clone());
        name
    }

    /// `pkg.Name` for an identifier exported by `path`
    pub fn qual(&mut self, path: &str, ident: &str) -> String {
        format!("{}.{}", self.import(path), ident)
    }

    /// Imported paths with their local names, sorted by path
    pub fn imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(path, name)| (path.as_str(), name.as_str()))
    }

    /// Body written so far
    pub fn body(&self) -> &str { &self.body }

    /// Whether nothing was written to the body
    pub fn is_empty(&self) -> bool { self.body.trim().is_empty() }

    /// Full file text
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(header);
            out.push_str("\n\n");
        }
        out.push_str("package ");
        out.push_str(&self.package);
        out.push_str("\n\n");

        match self.imports.len() {
            0 => {}
            1 => {
                for (path, name) in &self.imports {
                    out.push_str("import ");
                    out.push_str(&import_spec(path, name));
                    out.push_str("\n\n");
                }
            }
            _ => {
                out.push_str("import (\n");
                for (path, name) in &self.imports {
                    out.push('\t');
                    out.push_str(&import_spec(path, name));
                    out.push('\n');
                }
                out.push_str(")\n\n");
            }
        }

        out.push_str(self.body.trim_start_matches('\n'));
        crate::clean_generated_source(&out)
    }

    fn free_name(&self, base: &str) -> String {
        let taken = |candidate: &str| {
            candidate == self.package || self.imports.values().any(|n| n == candidate)
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl fmt::Write for GoFile {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.body.push_str(s);
        Ok(())
    }
}

/// Header line marking a file as generated
pub fn generated_header() -> String {
    format!("// Code generated by microgen {}. DO NOT EDIT.", GENERATOR_VERSION)
}

fn import_spec(path: &str, name: &str) -> String {
    if package_name(path) == name {
        format!("\"{}\"", path)
    } else {
        format!("{} \"{}\"", name, path)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use super::*;

    #[test]
    fn imports_are_sorted_and_aliased_on_collision() {
        let mut file = GoFile::new("transportgrpc");
        assert_eq!(file.import("google.golang.org/grpc"), "grpc");
        assert_eq!(file.import("github.com/go-kit/kit/transport/grpc"), "grpc1");
        assert_eq!(file.import("google.golang.org/grpc"), "grpc");
        assert_eq!(file.import("github.com/opentracing/opentracing-go"), "opentracinggo");
        writeln!(file, "var _ = grpc.ClientConn{{}}").expect("write body");

        let text = file.render();
        assert!(text.starts_with("// Code generated by microgen "));
        assert!(text.contains(
            "import (\n\tgrpc1 \"github.com/go-kit/kit/transport/grpc\"\n\
             \topentracinggo \"github.com/opentracing/opentracing-go\"\n\
             \t\"google.golang.org/grpc\"\n)\n"
        ));
        assert!(text.ends_with("var _ = grpc.ClientConn{}\n"));
    }

    #[test]
    fn package_name_is_never_reused_as_alias() {
        let mut file = GoFile::new("service");
        assert_eq!(file.import("github.com/acme/service"), "service1");
    }

    #[test]
    fn preferred_alias_applies_only_when_imported() {
        let mut file =
            GoFile::new("transport").with_alias("github.com/acme/string-svc", "stringsvc");
        assert_eq!(file.imports().count(), 0);
        assert_eq!(file.qual("github.com/acme/string-svc", "Comment"), "stringsvc.Comment");
        assert!(file.render().contains("import stringsvc \"github.com/acme/string-svc\""));
    }

    #[test]
    fn single_import_uses_short_form() {
        let mut file = GoFile::editable("main");
        file.import("context");
        assert_eq!(file.render(), "package main\n\nimport \"context\"\n");
    }
}
