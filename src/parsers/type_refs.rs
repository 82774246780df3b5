//! Lexical type-reference mining for the brace/namespace languages.
//!
//! Every capitalized identifier that shows up in a type position (declarations,
//! parameters, return types, generic arguments, base lists, `new`, static member
//! access, casts and type checks) becomes a `type-reference` dependency, minus
//! built-in types, generic parameters and the file's own declarations.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

use super::common::LineIndex;
use super::{ImportKind, ImportRecord};

pub const CSHARP_BUILTINS: &[&str] = &[
    "Action", "ArgumentException", "ArgumentNullException", "ArgumentOutOfRangeException",
    "Array", "Attribute", "Boolean", "Byte", "CancellationToken", "Char", "Console", "DateOnly",
    "DateTime", "DateTimeOffset", "Decimal", "Dictionary", "Double", "Enum", "Environment",
    "EventArgs", "EventHandler", "Exception", "File", "Func", "GC", "Guid", "HashSet",
    "ICollection", "IDictionary", "IDisposable", "IEnumerable", "IEnumerator", "IList",
    "IQueryable", "IReadOnlyCollection", "IReadOnlyDictionary", "IReadOnlyList", "ISet",
    "Int16", "Int32", "Int64", "IntPtr", "InvalidOperationException", "KeyValuePair", "Lazy",
    "List", "Math", "Memory", "NotImplementedException", "NotSupportedException", "Nullable",
    "Object", "Path", "Queue", "Random", "ReadOnlySpan", "SByte", "Single", "Span", "Stack",
    "Stream", "String", "StringBuilder", "Task", "Thread", "TimeSpan", "Tuple", "Type",
    "UInt16", "UInt32", "UInt64", "Uri", "ValueTask", "ValueTuple", "Void",
];

pub const JAVA_BUILTINS: &[&str] = &[
    "ArrayList", "Arrays", "Boolean", "Byte", "Character", "Class", "Collection", "Collections",
    "Collectors", "Comparable", "Comparator", "CompletableFuture", "Deprecated", "Double",
    "Enum", "Exception", "Float", "FunctionalInterface", "Function", "HashMap", "HashSet",
    "IllegalArgumentException", "IllegalStateException", "Integer", "Iterable", "Iterator",
    "LinkedHashMap", "LinkedList", "List", "Long", "Map", "Math", "Number", "Object",
    "Objects", "Optional", "Override", "Runnable", "RuntimeException", "Set", "Short",
    "Stream", "String", "StringBuilder", "Supplier", "Consumer", "Predicate", "SuppressWarnings",
    "System", "Thread", "Throwable", "TreeMap", "TreeSet", "UnsupportedOperationException",
    "Void", "BigDecimal", "BigInteger", "LocalDate", "LocalDateTime", "Instant", "Duration",
    "UUID", "IOException",
];

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9_]*").expect("valid identifier regex"));

static NEW_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnew\s+([A-Z]\w*)").expect("valid new regex"));

static CSHARP_BASE_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:class|struct|interface|record)\s+\w+\s*(?:<[^>]*>)?\s*(?:\([^)]*\))?\s*:\s*([^{;]+)",
    )
    .expect("valid base list regex")
});

static JAVA_HERITAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:extends|implements)\s+([^{;]+)").expect("valid heritage regex")
});

static STATIC_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]\w*)\s*\.\s*[A-Za-z_]").expect("valid static access regex")
});

static CAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*([A-Z]\w*)(?:<[^<>()]*>)?\s*\)\s*[\w(]").expect("valid cast regex")
});

static TYPE_CHECK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:is|as|instanceof)\s+([A-Z]\w*)").expect("valid type check regex")
});

static TYPEOF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btypeof\s*\(\s*([A-Z]\w*)").expect("valid typeof regex"));

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z]\w*)\s*(?:<[^<>;(){}=]*(?:<[^<>;(){}=]*>[^<>;(){}=]*)*>)?\s*(?:\[\s*\])*\??\s+@?[A-Za-z_]\w*\s*[=;,)(:{]",
    )
    .expect("valid declaration regex")
});

/// Argument spans of outermost generic lists: for `Map<A, List<B>>` the span
/// covers `A, List<B>`. A `<` only opens a list right after an identifier, and
/// statement punctuation before the matching `>` means it was a comparison.
fn generic_spans(code: &str) -> Vec<Range<usize>> {
    let bytes = code.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' && follows_identifier(&code[..i]) {
            if let Some(close) = matching_angle(bytes, i) {
                spans.push(i + 1..close);
                i = close + 1;
                continue;
            }
        }
        i += 1;
    }
    spans
}

fn follows_identifier(before: &str) -> bool {
    before
        .trim_end()
        .bytes()
        .next_back()
        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn matching_angle(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            b';' | b'(' | b')' | b'{' | b'}' | b'=' | b'&' | b'|' => return None,
            _ => {}
        }
    }
    None
}

/// Generic parameter names such as `T`, `TKey`, `TResult`.
fn is_generic_parameter(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.len() {
        1 => true,
        n if n >= 3 => bytes[0] == b'T' && bytes[1].is_ascii_uppercase() && bytes[2].is_ascii_lowercase(),
        _ => false,
    }
}

/// Mine type references from `code`, which must already have comments,
/// string literals and import/namespace directives blanked out.
pub fn mine_type_references(
    code: &str,
    lines: &LineIndex,
    builtins: &[&str],
    declared: &[String],
) -> Vec<ImportRecord> {
    let mut found: Vec<(usize, &str)> = Vec::new();

    let mut single = |regex: &Regex| {
        for caps in regex.captures_iter(code) {
            if let Some(name) = caps.get(1) {
                found.push((name.start(), name.as_str()));
            }
        }
    };
    single(&*NEW_EXPR);
    single(&*CAST);
    single(&*TYPE_CHECK);
    single(&*TYPEOF);
    single(&*DECLARATION);

    for caps in STATIC_ACCESS.captures_iter(code) {
        let Some(name) = caps.get(1) else { continue };
        // `a.B.c` is member access on a value, not a type
        if code[..name.start()].ends_with('.') {
            continue;
        }
        found.push((name.start(), name.as_str()));
    }

    for span in generic_spans(code) {
        for ident in IDENT.find_iter(&code[span.clone()]) {
            found.push((span.start + ident.start(), ident.as_str()));
        }
    }

    for regex in [&*CSHARP_BASE_LIST, &*JAVA_HERITAGE] {
        for caps in regex.captures_iter(code) {
            let Some(list) = caps.get(1) else { continue };
            for ident in IDENT.find_iter(list.as_str()) {
                found.push((list.start() + ident.start(), ident.as_str()));
            }
        }
    }

    found.sort_by_key(|(offset, _)| *offset);

    let mut seen: HashSet<&str> = HashSet::new();
    found
        .into_iter()
        .filter(|(_, name)| {
            !builtins.contains(name)
                && !declared.iter().any(|d| d == name)
                && !is_generic_parameter(name)
        })
        .filter(|(_, name)| seen.insert(*name))
        .map(|(offset, name)| {
            ImportRecord::new(name, ImportKind::TypeReference, lines.line_of(offset), false)
        })
        .collect()
}

/// Replace every match of `regex` with spaces, newlines kept.
pub fn blank_matches(code: &str, regex: &Regex) -> String {
    let mut out = code.as_bytes().to_vec();
    for m in regex.find_iter(code) {
        for byte in &mut out[m.range()] {
            if *byte != b'\n' {
                *byte = b' ';
            }
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| code.to_string())
}
