use classdiff_model::{tokenize, Invocation, Statement, TypeRef, VariableDeclaration};

/// Identifiers followed by `(` that are not method calls.
const NON_CALL_KEYWORDS: &[&str] = &[
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "synchronized",
    "return",
    "new",
    "throw",
    "super",
    "this",
    "assert",
];

const NON_TYPE_KEYWORDS: &[&str] = &[
    "return", "throw", "new", "else", "case", "break", "continue", "do", "try", "yield", "this",
    "super",
];

/// A leaf statement with invocations and declarations derived from `text`.
pub fn stmt(text: &str) -> Statement {
    let mut statement = Statement::leaf(text);
    statement.invocations = invocations_in(text);
    statement.declarations = declaration_in(text).into_iter().collect();
    statement
}

/// A composite statement (`if(..)`, `for(..)`, ...) whose children sit in a block.
pub fn compound(header: &str, children: Vec<Statement>) -> Statement {
    let mut statement = Statement::composite(header, vec![Statement::block(children)]);
    statement.invocations = invocations_in(header);
    statement
}

/// Method calls appearing in `text`, outermost first.
pub fn invocations_in(text: &str) -> Vec<Invocation> {
    let tokens = tokenize(text);
    let mut out = Vec::new();
    for idx in 0..tokens.len() {
        let name = tokens[idx];
        if !is_identifier(name)
            || tokens.get(idx + 1) != Some(&"(")
            || NON_CALL_KEYWORDS.contains(&name)
        {
            continue;
        }
        if idx > 0 && tokens[idx - 1] == "new" {
            continue;
        }
        let Some(close) = matching_paren(&tokens, idx + 1) else {
            continue;
        };
        let arguments = split_top_level(&tokens[idx + 2..close])
            .into_iter()
            .map(join_tokens)
            .collect();
        let mut invocation = Invocation::new(name, arguments);
        if let Some(receiver) = receiver_before(&tokens, idx) {
            invocation = invocation.with_receiver(receiver);
        }
        out.push(invocation);
    }
    out
}

/// The local variable declared by `text` (`Type name = ..;` or `Type name;`).
pub fn declaration_in(text: &str) -> Option<VariableDeclaration> {
    let tokens = tokenize(text);
    let mut rest: &[&str] = &tokens;
    while let Some((&"final", tail)) = rest.split_first() {
        rest = tail;
    }
    let first = *rest.first()?;
    if !is_identifier(first) || NON_TYPE_KEYWORDS.contains(&first) {
        return None;
    }
    let end = rest.iter().position(|t| matches!(*t, "=" | ";" | ":"))?;
    let name_idx = end.checked_sub(1)?;
    if name_idx == 0 {
        return None;
    }
    // `a == b` and compound assignments are not declarations.
    if rest[end] == "=" && rest.get(end + 1) == Some(&"=") {
        return None;
    }
    let name = rest[name_idx];
    let type_tokens = &rest[..name_idx];
    let well_formed = is_identifier(name)
        && type_tokens
            .iter()
            .all(|t| is_identifier(t) || matches!(*t, "." | "<" | ">" | "," | "[" | "]" | "?"))
        && matches!(type_tokens.last(), Some(t) if is_identifier(t) || *t == ">" || *t == "]");
    if !well_formed {
        return None;
    }
    Some(VariableDeclaration {
        name: name.to_string(),
        ty: TypeRef::new(join_tokens(type_tokens)),
    })
}

pub(crate) fn is_identifier(token: &str) -> bool {
    token.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$')
}

fn is_word(token: &str) -> bool {
    token.starts_with(|c: char| c.is_alphanumeric() || matches!(c, '_' | '$' | '"' | '\''))
}

/// Re-joins tokens, keeping a space only where two words would otherwise fuse.
pub(crate) fn join_tokens(tokens: &[&str]) -> String {
    let mut out = String::new();
    let mut prev: Option<&str> = None;
    for token in tokens {
        match prev {
            Some(p) if is_word(p) && is_word(token) => out.push(' '),
            Some(",") => out.push(' '),
            _ => {}
        }
        out.push_str(token);
        prev = Some(token);
    }
    out
}

pub(crate) fn split_top_level<'s, 't>(tokens: &'s [&'t str]) -> Vec<&'s [&'t str]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, token) in tokens.iter().enumerate() {
        match *token {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth -= 1,
            "," if depth == 0 => {
                out.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&tokens[start..]);
    out
}

fn matching_paren(tokens: &[&str], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match *token {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn receiver_before(tokens: &[&str], idx: usize) -> Option<String> {
    let mut parts = Vec::new();
    let mut pos = idx;
    while pos >= 2 && tokens[pos - 1] == "." && is_identifier(tokens[pos - 2]) {
        parts.push(tokens[pos - 2]);
        pos -= 2;
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}
