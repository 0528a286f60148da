//! Declarations of one parsed Go source file
//!
//! A `SourceFile` is loaded from the JSON emitted by the external parser. The
//! same shape describes the service declaration file and the optional wire
//! struct file (`*.pb.go`), which is then indexed into a [`WireStructFile`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::TypeRef;
use crate::Result;

/// One parsed source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Go package name declared by the file
    pub package: String,
    /// Interface declarations in source order
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
    /// Struct declarations in source order
    #[serde(default)]
    pub structs: Vec<StructDecl>,
}

/// An interface declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    /// Interface name
    pub name: String,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    /// Doc-comment lines attached to the interface, verbatim
    #[serde(default)]
    pub docs: Vec<String>,
}

/// A method declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Method name, unique within its interface
    pub name: String,
    /// Arguments in order
    #[serde(default)]
    pub args: Vec<Parameter>,
    /// Results in order
    #[serde(default)]
    pub results: Vec<Parameter>,
    /// Doc-comment lines attached to the method, verbatim
    #[serde(default)]
    pub docs: Vec<String>,
}

/// A named (or unnamed) argument or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name; empty when the source left it unnamed
    #[serde(default)]
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A struct declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    /// Struct name
    pub name: String,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// A struct field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl SourceFile {
    /// Load a source file model from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a source file model from JSON text
    pub fn from_json(content: &str) -> Result<Self> { Ok(serde_json::from_str(content)?) }

    /// Save this model to a JSON file with pretty formatting
    pub fn to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        use std::io::Write;
        writeln!(file)?;
        Ok(())
    }

    /// Get an interface by name
    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

impl InterfaceDecl {
    /// Get a method by name
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl MethodDecl {
    /// Whether the first argument is `context.Context`
    pub fn is_context_first(&self) -> bool { self.args.first().is_some_and(|p| p.ty.is_context()) }

    /// Whether the last result is `error`
    pub fn is_error_last(&self) -> bool { self.results.last().is_some_and(|p| p.ty.is_error()) }

    /// Arguments with a leading context argument removed
    pub fn args_without_context(&self) -> &[Parameter] {
        if self.is_context_first() {
            &self.args[1..]
        } else {
            &self.args
        }
    }

    /// Results with a trailing error result removed
    pub fn results_without_error(&self) -> &[Parameter] {
        if self.is_error_last() {
            &self.results[..self.results.len() - 1]
        } else {
            &self.results
        }
    }

    /// All arguments followed by all results
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.args.iter().chain(self.results.iter())
    }
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self { Self { name: name.into(), ty } }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.name, self.ty)
        }
    }
}

impl StructDecl {
    /// Get a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldDecl {
    /// Create a field
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self { Self { name: name.into(), ty } }
}

/// Lookup table of the structs declared by an externally generated wire file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireStructFile {
    structs: BTreeMap<String, StructDecl>,
}

impl WireStructFile {
    /// Index the structs of a parsed wire file; the first declaration of a name wins
    pub fn from_source(source: &SourceFile) -> Self { Self::from_structs(source.structs.clone()) }

    /// Index a list of struct declarations
    pub fn from_structs(structs: impl IntoIterator<Item = StructDecl>) -> Self {
        let mut by_name = BTreeMap::new();
        for s in structs {
            by_name.entry(s.name.clone()).or_insert(s);
        }
        Self { structs: by_name }
    }

    /// Load and index a wire file model from JSON
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::from_source(&SourceFile::from_file(path)?))
    }

    /// Find a struct by name
    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> { self.structs.get(name) }

    /// Number of indexed structs
    pub fn len(&self) -> usize { self.structs.len() }

    /// Whether no struct is indexed
    pub fn is_empty(&self) -> bool { self.structs.is_empty() }
}
