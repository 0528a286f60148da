//! Tag extraction from doc-comment lines
//!
//! A directive line is `//`, optional whitespace, then a sentinel such as
//! `@microgen`; the rest of the line is a list of tokens separated by commas
//! and/or whitespace. Order and duplicates are preserved.

/// Comment marker every directive line starts with.
pub const TAG_MARK: &str = "//";
/// Sentinel of generation directives.
pub const MICROGEN_TAG: &str = "@microgen";
/// Sentinel of the HTTP verb hint of a method.
pub const HTTP_METHOD_TAG: &str = "@http-method";
/// Sentinel of the HTTP path template of a method.
pub const HTTP_PATH_TAG: &str = "@http-path";
/// Sentinel listing parameters the logging middleware must not print.
pub const LOGS_IGNORE_TAG: &str = "@logs-ignore";
/// Sentinel listing parameters the logging middleware prints by length.
pub const LOGS_LEN_TAG: &str = "@logs-len";
/// Sentinel of the protobuf stubs import path.
pub const PROTOBUF_TAG: &str = "@protobuf";
/// Sentinel of the fully qualified gRPC service name.
pub const GRPC_ADDR_TAG: &str = "@grpc-addr";

/// Tokens of every directive line for `sentinel`, in order
pub fn fetch_tags(docs: &[String], sentinel: &str) -> Vec<String> {
    docs.iter()
        .filter_map(|line| directive_remainder(line, sentinel))
        .flat_map(split_tokens)
        .map(str::to_string)
        .collect()
}

/// Whether any line is a directive line for `sentinel`, even an empty one
pub fn has_tag_line(docs: &[String], sentinel: &str) -> bool {
    docs.iter().any(|line| directive_remainder(line, sentinel).is_some())
}

/// Existence check over extracted tokens
pub fn contains_tag(tags: &[String], tag: &str) -> bool { tags.iter().any(|t| t == tag) }

fn directive_remainder<'a>(line: &'a str, sentinel: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(TAG_MARK)?.trim_start().strip_prefix(sentinel)?;
    // `@microgen-x` is not `@microgen`
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == ',' => Some(rest),
        Some(_) => None,
    }
}

fn split_tokens(rest: &str) -> impl Iterator<Item = &str> {
    rest.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty())
}
