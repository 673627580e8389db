//! Validation of namespaces and resource paths.

use crate::error::DefinitionError;

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

fn invalid(name: &str, reason: &'static str) -> DefinitionError {
    DefinitionError::InvalidName {
        name: name.to_string(),
        reason,
    }
}

/// Check that `namespace` only uses `[a-z0-9_.-]`.
pub(crate) fn validate_namespace(namespace: &str) -> Result<(), DefinitionError> {
    if namespace.is_empty() {
        return Err(invalid(namespace, "namespace is empty"));
    }
    if !namespace.chars().all(is_namespace_char) {
        return Err(invalid(namespace, "namespace may only contain [a-z0-9_.-]"));
    }
    Ok(())
}

/// Check that `name` is a single path segment.
pub(crate) fn validate_segment(name: &str) -> Result<(), DefinitionError> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    if !name.chars().all(is_namespace_char) {
        return Err(invalid(name, "name may only contain [a-z0-9_.-]"));
    }
    Ok(())
}

/// Check that `path` is a `/` separated list of valid segments.
pub(crate) fn validate_path(path: &str) -> Result<(), DefinitionError> {
    if path.is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    path.split('/').try_for_each(|segment| {
        if segment.is_empty() {
            Err(invalid(path, "path contains an empty segment"))
        } else {
            validate_segment(segment).map_err(|_| invalid(path, "path may only contain [a-z0-9_.-/]"))
        }
    })
}

/// Check a `namespace:path` resource location. The namespace may be omitted.
pub(crate) fn validate_resource_location(location: &str) -> Result<(), DefinitionError> {
    match location.split_once(':') {
        Some((namespace, path)) => {
            validate_namespace(namespace).and_then(|()| validate_path(path))
        }
        None => validate_path(location),
    }
}

/// Join the non-empty parts with `/`.
pub(crate) fn join_path<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(validate_namespace("tmp").is_ok());
        assert!(validate_namespace("Tmp").is_err());
        assert!(validate_segment("give_item").is_ok());
        assert!(validate_segment("a/b").is_err());
        assert!(validate_path("dev_tools/internal").is_ok());
        assert!(validate_path("dev_tools//internal").is_err());
        assert!(validate_resource_location("tmp:outer/inner").is_ok());
        assert!(validate_resource_location("tmp:").is_err());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(["", "outer", "", "init"]), "outer/init");
        assert_eq!(join_path([""]), "");
    }
}
