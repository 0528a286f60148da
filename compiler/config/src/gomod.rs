//! Import path discovery from `go.mod`

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::ConfigError;

const GO_MOD_FILE_NAME: &str = "go.mod";

/// Read the `module` directive of a `go.mod` file
pub fn module_path_from_go_mod(path: &Path) -> Result<String, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let re = Regex::new(r"(?m)^\s*module\s+(\S+)").map_err(|_| module_not_found(path))?;
    re.captures(&contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('"').to_string())
        .ok_or_else(|| module_not_found(path))
}

/// Import path of `dir`: the nearest enclosing module path joined with the
/// directory's path below the module root
pub fn discover_import_package(dir: &Path) -> Result<String, ConfigError> {
    let absolute = absolutize(dir)?;
    for ancestor in absolute.ancestors() {
        let go_mod = ancestor.join(GO_MOD_FILE_NAME);
        if !go_mod.is_file() {
            continue;
        }
        let module = module_path_from_go_mod(&go_mod)?;
        let relative = absolute.strip_prefix(ancestor).map_err(|_| module_not_found(dir))?;
        let mut import_path = module;
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                import_path.push('/');
                import_path.push_str(&segment.to_string_lossy());
            }
        }
        return Ok(import_path);
    }
    Err(module_not_found(dir))
}

fn absolutize(dir: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(canonical) = dir.canonicalize() {
        return Ok(canonical);
    }
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

fn module_not_found(path: &Path) -> ConfigError {
    ConfigError::ModulePathNotFound(path.to_path_buf())
}
