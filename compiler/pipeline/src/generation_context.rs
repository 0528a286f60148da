//! Generation context for the pipeline.
//!
//! This module provides a unified context that encapsulates everything the
//! artifact renderers and the planner need to know about one run.

use std::path::{Path, PathBuf};

use codegen::utils::to_snake_case;
use config::GenerationFlags;
use ir::{InterfaceDecl, MethodDecl};
use semantics::{DirectiveSet, GenerationMode, MethodDirectives};

use crate::PipelineError;

/// Context containing all metadata needed for code generation
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// The tagged service interface
    pub interface: InterfaceDecl,
    /// Interpreted directives of the interface and its methods
    pub directives: DirectiveSet,
    /// Go package name declared by the source file
    pub source_package: String,
    /// Resolved generation flags
    pub flags: GenerationFlags,
    /// Fully qualified gRPC service name
    pub grpc_address: String,
}

impl GenerationContext {
    /// Create a new builder for GenerationContext
    pub fn builder() -> GenerationContextBuilder { GenerationContextBuilder::default() }

    /// Name of the service interface
    pub fn service_name(&self) -> &str { &self.interface.name }

    /// snake_case name of the service, used for file names
    pub fn service_file_name(&self) -> String { to_snake_case(&self.interface.name) }

    /// Import path of the service package
    pub fn service_import(&self) -> &str { &self.flags.import_package }

    /// Import path of the generated transport package
    pub fn transport_import(&self) -> String { format!("{}/transport", self.service_import()) }

    /// Import path of the generated service middleware package
    pub fn middleware_import(&self) -> String { format!("{}/service", self.service_import()) }

    /// Import path of the generated gRPC transport package
    pub fn grpc_transport_import(&self) -> String {
        format!("{}/transport/grpc", self.service_import())
    }

    /// Import path of the generated HTTP transport package
    pub fn http_transport_import(&self) -> String {
        format!("{}/transport/http", self.service_import())
    }

    /// Import path of the protobuf stubs, when given with `@protobuf`
    pub fn protobuf_import(&self) -> Option<&str> {
        self.directives.interface.protobuf_import.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Base directory of every artifact path
    pub fn output_dir(&self) -> &Path { &self.flags.output_dir }

    /// Package field of the protocol-definition file
    pub fn protocol_package(&self) -> &str { self.flags.protocol_package.trim() }

    /// Directives of one method
    pub fn method_directives(&self, method: &MethodDecl) -> Option<&MethodDirectives> {
        self.directives.method(&method.name)
    }

    /// Mode of one method
    pub fn mode_of(&self, method: &MethodDecl) -> GenerationMode {
        self.directives.mode_of(&method.name)
    }

    /// Methods turned into request/response exchanges
    pub fn default_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.interface.methods.iter().filter(|m| self.mode_of(m) == GenerationMode::Default)
    }

    /// Methods that take part in generation at all
    pub fn generated_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.interface.methods.iter().filter(|m| self.mode_of(m) != GenerationMode::Excluded)
    }
}

#[derive(Debug, Default)]
/// Builder for GenerationContext
pub struct GenerationContextBuilder {
    /// The tagged service interface
    interface: Option<InterfaceDecl>,
    /// Interpreted directives; interpreted from the interface when absent
    directives: Option<DirectiveSet>,
    /// Go package name declared by the source file
    source_package: Option<String>,
    /// Resolved generation flags
    flags: Option<GenerationFlags>,
}

impl GenerationContextBuilder {
    /// Set the service interface
    pub fn interface(mut self, interface: InterfaceDecl) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Set already interpreted directives
    pub fn directives(mut self, directives: DirectiveSet) -> Self {
        self.directives = Some(directives);
        self
    }

    /// Set the source package name
    pub fn source_package(mut self, package: impl Into<String>) -> Self {
        self.source_package = Some(package.into());
        self
    }

    /// Set the generation flags
    pub fn flags(mut self, flags: GenerationFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Set the output directory, keeping the other flags
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.flags.get_or_insert_with(GenerationFlags::default).output_dir = dir;
        self
    }

    /// Build the GenerationContext
    pub fn build(self) -> Result<GenerationContext, PipelineError> {
        let interface = self
            .interface
            .ok_or_else(|| PipelineError::Message("interface is required".to_string()))?;
        let source_package = self
            .source_package
            .ok_or_else(|| PipelineError::Message("source_package is required".to_string()))?;
        let flags = self
            .flags
            .ok_or_else(|| PipelineError::Message("flags are required".to_string()))?;
        let directives = self.directives.unwrap_or_else(|| DirectiveSet::interpret(&interface));

        let grpc_address = match &directives.interface.grpc_address {
            Some(address) => address.clone(),
            None => {
                let package = match flags.protocol_package.trim() {
                    "" => source_package.as_str(),
                    proto => proto,
                };
                format!("{}.{}", package, interface.name)
            }
        };

        Ok(GenerationContext { interface, directives, source_package, flags, grpc_address })
    }
}
