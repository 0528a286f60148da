//! Case conversions and Go identifier helpers

/// Go's predeclared types; never package-qualified
pub const GO_BUILTIN_TYPES: &[&str] = &[
    "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int", "int8",
    "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64",
    "uintptr", "any",
];

/// Whether `name` is one of Go's predeclared types
pub fn is_builtin_type(name: &str) -> bool { GO_BUILTIN_TYPES.contains(&name) }

/// Upper-case the first letter, exporting a Go identifier
pub fn to_upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower-case the first letter
pub fn to_lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert CamelCase to snake_case, keeping acronyms together
///
/// ```
/// use microgen_codegen::utils::to_snake_case;
/// assert_eq!(to_snake_case("StringService"), "string_service");
/// assert_eq!(to_snake_case("HTTPService"), "http_service");
/// ```
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev_lower = chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit();
            let acronym_end = chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if (prev_lower || acronym_end) && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Turn an arbitrary path segment into a valid Go package identifier
pub fn sanitize_package_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    match cleaned.chars().next() {
        None => "pkg".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        Some(_) => cleaned,
    }
}
