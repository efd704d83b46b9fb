//! # Contract Boundary Parsing
//!
//! @title Solidity Contract and Declaration Parser
//! @author Ramprasad
//!
//! Locates contract/interface/library declarations in comment-stripped
//! source, then enumerates the declarations inside each body: state
//! variables with visibility and mutability, modifiers, and function
//! signatures. Function and modifier bodies are handed to
//! [`statement_parser`](super::statement_parser) for statement sequencing.
//!
//! The scanners here work on byte offsets and brace depth rather than a
//! grammar: Solidity's block punctuation is ASCII, string literals are
//! skipped explicitly, and everything that fails to match a known
//! declaration shape is ignored or downgraded to a parse warning.

use super::statement_parser::{contains_word, parse_statements};
use super::{
    ContractKind, ContractUnit, Function, Modifier, Parameter, ParseIssue, StateMutability,
    StateVariable, VarMutability, Visibility,
};
use regex::Regex;

/// Parses one source file into contract units plus recoverable issues.
///
/// Never fails: a contract that cannot be fully parsed is produced
/// best-effort with a warning, and siblings are unaffected.
pub(crate) fn parse_source(source: &str) -> (Vec<ContractUnit>, Vec<ParseIssue>) {
    let mut issues = Vec::new();
    let stripped = strip_comments(source, &mut issues);

    let decl_re = Regex::new(
        r"\b(abstract\s+contract|contract|interface|library)\s+([A-Za-z_]\w*)\s*([^{;]*)\{",
    )
    .expect("static regex");

    let mut units = Vec::new();
    let mut last_end = 0usize;

    for caps in decl_re.captures_iter(&stripped) {
        let mat = caps.get(0).expect("whole match");
        if mat.start() < last_end {
            // Declaration text inside a previously parsed body (e.g. a
            // string literal); not a real sibling.
            continue;
        }

        let kind = match caps.get(1).map(|m| m.as_str()) {
            Some("interface") => ContractKind::Interface,
            Some("library") => ContractKind::Library,
            _ => ContractKind::Contract,
        };
        let name = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
        let inherits = parse_heritage(caps.get(3).map(|m| m.as_str()).unwrap_or(""));

        let decl_line = line_of(&stripped, mat.start());
        let body_open = mat.end() - 1;

        let body = match scan_matching_brace(&stripped, body_open) {
            Some(close) => {
                last_end = close + 1;
                &stripped[body_open + 1..close]
            }
            None => {
                issues.push(ParseIssue::UnbalancedBraces {
                    name: name.clone(),
                    line: decl_line,
                });
                // Best effort: treat the remainder of the file as the body,
                // but keep scanning so siblings still extract.
                last_end = body_open + 1;
                &stripped[body_open + 1..]
            }
        };

        let body_line = line_of(&stripped, body_open);
        units.push(parse_contract_body(
            name, kind, inherits, body, decl_line, body_line, &mut issues,
        ));
    }

    if units.is_empty()
        && (contains_word(&stripped, "contract")
            || contains_word(&stripped, "interface")
            || contains_word(&stripped, "library"))
    {
        issues.push(ParseIssue::NoContractFound);
    }

    (units, issues)
}

/// Replaces comments with spaces, preserving line structure and offsets.
///
/// String literals are left intact so later phases can see require
/// messages; an unterminated block comment is recorded as an issue and
/// everything after it is blanked.
fn strip_comments(source: &str, issues: &mut Vec<ParseIssue>) -> String {
    #[derive(PartialEq, Clone, Copy)]
    enum State {
        Code,
        Line,
        Block { start_line: usize },
        Str(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut line = 1usize;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

        match state {
            State::Code => {
                if c == '/' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                } else if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block { start_line: line };
                } else {
                    if c == '"' || c == '\'' {
                        state = State::Str(c);
                    }
                    out.push(c);
                }
            }
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::Block { start_line } => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
                if chars.peek().is_none() && matches!(state, State::Block { .. }) {
                    issues.push(ParseIssue::UnterminatedComment { line: start_line });
                }
            }
            State::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        if escaped == '\n' {
                            line += 1;
                        }
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
        }
    }

    out
}

/// Returns the 1-indexed line of a byte offset.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Finds the byte offset of the brace matching `open_idx`, skipping
/// string literals. Returns `None` if the block runs to end of input.
pub(crate) fn scan_matching_brace(text: &str, open_idx: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes.get(open_idx), Some(&b'{'));

    let mut depth = 0usize;
    let mut i = open_idx;
    let mut in_str: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_str {
            if b == b'\\' {
                i += 1;
            } else if b == quote || b == b'\n' {
                in_str = None;
            }
        } else {
            match b {
                b'"' | b'\'' => in_str = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }

    None
}

/// Parses the `is A, B` heritage clause into inherited names.
fn parse_heritage(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let rest = match clause.strip_prefix("is") {
        Some(rest) if rest.starts_with(|c: char| c.is_whitespace()) => rest,
        _ => return Vec::new(),
    };

    rest.split(',')
        .filter_map(|part| {
            let name: String = part
                .trim()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        })
        .collect()
}

/// One top-level item inside a contract body.
struct RawItem {
    /// Declaration text before the block (or the whole `;` declaration).
    header: String,

    /// Block contents, if the item carries a `{ ... }` body.
    block: Option<String>,

    /// Source line of the item start.
    line: usize,

    /// Source line of the block open brace.
    block_line: usize,
}

/// Parses one contract body into a [`ContractUnit`].
///
/// Two passes: state variables first (Solidity allows declarations in any
/// order, and statement classification needs the full variable list), then
/// functions and modifiers.
fn parse_contract_body(
    name: String,
    kind: ContractKind,
    inherits: Vec<String>,
    body: &str,
    decl_line: usize,
    body_line: usize,
    issues: &mut Vec<ParseIssue>,
) -> ContractUnit {
    let items = split_body_items(body, body_line);

    let mut state_variables = Vec::new();
    for item in &items {
        if item.block.is_none() && !starts_with_keyword(&item.header) {
            if let Some(var) = parse_state_variable(&item.header, item.line) {
                state_variables.push(var);
            }
        }
    }

    let state_names: Vec<String> = state_variables.iter().map(|v| v.name.clone()).collect();

    let mut functions = Vec::new();
    let mut modifiers = Vec::new();

    for item in &items {
        match leading_ident(&item.header) {
            "function" | "constructor" | "receive" | "fallback" => {
                match parse_function_signature(&item.header, &name, item.line) {
                    Ok(sig) => {
                        let body_stmts = item
                            .block
                            .as_deref()
                            .map(|b| parse_statements(b, item.block_line, &state_names))
                            .unwrap_or_default();

                        let has_external_call = body_stmts
                            .iter()
                            .any(|s| matches!(s.kind, super::StatementKind::ExternalCall { .. }));
                        let has_loop = body_stmts
                            .iter()
                            .any(|s| matches!(s.kind, super::StatementKind::LoopHeader));

                        functions.push(Function {
                            name: sig.name,
                            visibility: sig.visibility,
                            mutability: sig.mutability,
                            modifiers: sig.modifiers,
                            params: sig.params,
                            body: body_stmts,
                            has_external_call,
                            has_loop,
                            is_constructor: sig.is_constructor,
                            is_receive_or_fallback: sig.is_receive_or_fallback,
                            index: functions.len(),
                            line: item.line,
                        });
                    }
                    Err(issue) => issues.push(issue),
                }
            }
            "modifier" => {
                if let Some(modifier_name) = identifier_after(&item.header, "modifier") {
                    let body_stmts = item
                        .block
                        .as_deref()
                        .map(|b| parse_statements(b, item.block_line, &state_names))
                        .unwrap_or_default();

                    modifiers.push(Modifier {
                        name: modifier_name,
                        body: body_stmts,
                        line: item.line,
                    });
                }
            }
            _ => {}
        }
    }

    ContractUnit {
        name,
        kind,
        inherits,
        state_variables,
        functions,
        modifiers,
        file_path: String::new(),
        order: 0,
        line: decl_line,
    }
}

/// Splits a contract body into top-level items: `;`-terminated
/// declarations and `header { block }` pairs.
fn split_body_items(body: &str, body_line: usize) -> Vec<RawItem> {
    let bytes = body.as_bytes();
    let mut items = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    let mut in_str: Option<u8> = None;
    let mut paren_depth = 0usize;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(quote) = in_str {
            if b == b'\\' {
                i += 1;
            } else if b == quote || b == b'\n' {
                in_str = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => in_str = Some(b),
            b'(' | b'[' => paren_depth += 1,
            b')' | b']' => paren_depth = paren_depth.saturating_sub(1),
            b';' if paren_depth == 0 => {
                let header = body[start..i].trim().to_string();
                if !header.is_empty() {
                    items.push(RawItem {
                        line: body_line + newlines_in(&body[..start_of_text(body, start, i)]),
                        block_line: 0,
                        header,
                        block: None,
                    });
                }
                start = i + 1;
            }
            b'{' if paren_depth == 0 => {
                let header = body[start..i].trim().to_string();
                let close = scan_matching_brace(body, i).unwrap_or(bytes.len());
                let block = body[i + 1..close.min(bytes.len())].to_string();
                items.push(RawItem {
                    line: body_line + newlines_in(&body[..start_of_text(body, start, i)]),
                    block_line: body_line + newlines_in(&body[..i]),
                    header,
                    block: Some(block),
                });
                i = close;
                start = i + 1;
            }
            _ => {}
        }

        i += 1;
    }

    items
}

/// Offset of the first non-whitespace byte of an item, for line reporting.
fn start_of_text(body: &str, start: usize, end: usize) -> usize {
    let bytes = body.as_bytes();
    let mut i = start;
    while i < end && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Number of newlines in a prefix.
fn newlines_in(prefix: &str) -> usize {
    prefix.bytes().filter(|&b| b == b'\n').count()
}

/// Leading identifier of an item header ("receive" in `receive() external`).
fn leading_ident(header: &str) -> &str {
    let trimmed = header.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

/// Returns `true` if an item header opens a declaration form that is not a
/// state variable (types, events, directives, stray nested declarations).
fn starts_with_keyword(header: &str) -> bool {
    matches!(
        leading_ident(header),
        "function"
            | "constructor"
            | "receive"
            | "fallback"
            | "modifier"
            | "struct"
            | "enum"
            | "event"
            | "error"
            | "using"
            | "pragma"
            | "import"
            | "contract"
            | "interface"
            | "library"
            | "type"
    )
}

/// Parses a state variable declaration.
///
/// Handles `mapping(...)` and array types, visibility and mutability
/// keywords in any order, and an optional initializer. Returns `None` for
/// anything that does not look like a variable.
fn parse_state_variable(decl: &str, line: usize) -> Option<StateVariable> {
    let decl = decl.trim().trim_end_matches(';').trim();
    if decl.is_empty() {
        return None;
    }

    let (head, initializer) = split_at_top_level_eq(decl);
    let has_initializer = initializer.is_some();

    let (ty, rest) = take_type(head.trim())?;

    let mut visibility = Visibility::Internal;
    let mut mutability = VarMutability::Mutable;
    let mut name: Option<String> = None;

    for token in rest.split_whitespace() {
        match token {
            "public" => visibility = Visibility::Public,
            "private" => visibility = Visibility::Private,
            "internal" => visibility = Visibility::Internal,
            "constant" => mutability = VarMutability::Constant,
            "immutable" => mutability = VarMutability::Immutable,
            "override" | "virtual" | "payable" | "transient" => {}
            t if is_identifier(t) => name = Some(t.to_string()),
            _ => return None,
        }
    }

    Some(StateVariable {
        name: name?,
        ty,
        visibility,
        mutability,
        has_initializer,
        line,
    })
}

/// Splits a declaration at the first top-level `=` (not `==`, `=>`, etc.).
fn split_at_top_level_eq(decl: &str) -> (&str, Option<&str>) {
    let bytes = decl.as_bytes();
    let mut depth = 0usize;

    for i in 0..bytes.len() {
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { 0 };
                let next = bytes.get(i + 1).copied().unwrap_or(0);
                if next != b'=' && next != b'>' && !b"=!<>+-*/%&|^".contains(&prev) {
                    return (&decl[..i], Some(&decl[i + 1..]));
                }
            }
            _ => {}
        }
    }

    (decl, None)
}

/// Consumes the leading type of a declaration, returning (type, rest).
///
/// `mapping(...)` types are consumed up to their balanced close paren,
/// including trailing `[]` array suffixes.
fn take_type(head: &str) -> Option<(String, &str)> {
    if head.is_empty() {
        return None;
    }

    if let Some(after) = head.strip_prefix("mapping") {
        let open = after.find('(')?;
        let bytes = after.as_bytes();
        let mut depth = 0usize;
        let mut end = None;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let mut end = end? + 1;
        while bytes.get(end) == Some(&b'[') {
            let close = after[end..].find(']')? + end;
            end = close + 1;
        }
        let ty = format!("mapping{}", &after[..end]);
        return Some((ty, &after[end..]));
    }

    let first = head.split_whitespace().next()?;
    if !first
        .chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
    {
        return None;
    }

    let rest = &head[head.find(first)? + first.len()..];
    Some((first.to_string(), rest))
}

/// Returns `true` for a plain identifier token.
fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Returns the identifier following a keyword, e.g. the name in
/// `modifier onlyOwner(...)`.
fn identifier_after(header: &str, keyword: &str) -> Option<String> {
    let rest = header.trim().strip_prefix(keyword)?;
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Parsed function signature metadata.
pub(crate) struct SignatureInfo {
    pub name: String,
    pub visibility: Visibility,
    pub mutability: StateMutability,
    pub modifiers: Vec<String>,
    pub params: Vec<Parameter>,
    pub is_constructor: bool,
    pub is_receive_or_fallback: bool,
}

/// Parses a function, constructor, receive, or fallback signature.
///
/// Functions without an explicit visibility default to `public` (the
/// pre-0.5 Solidity default); erring toward public keeps the access
/// control rules conservative.
pub(crate) fn parse_function_signature(
    header: &str,
    contract: &str,
    line: usize,
) -> Result<SignatureInfo, ParseIssue> {
    let header = header.trim();
    let malformed = || ParseIssue::MalformedSignature {
        contract: contract.to_string(),
        line,
    };

    let (name, is_constructor, is_receive_or_fallback, default_visibility) =
        if let Some(rest) = header.strip_prefix("function") {
            let name = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>();
            if name.is_empty() {
                return Err(malformed());
            }
            (name, false, false, Visibility::Public)
        } else if header.starts_with("constructor") {
            ("constructor".to_string(), true, false, Visibility::Public)
        } else if header.starts_with("receive") {
            ("receive".to_string(), false, true, Visibility::External)
        } else if header.starts_with("fallback") {
            ("fallback".to_string(), false, true, Visibility::External)
        } else {
            return Err(malformed());
        };

    let open = header.find('(').ok_or_else(malformed)?;
    let close = matching_paren(header, open).ok_or_else(malformed)?;
    let params = parse_params(&header[open + 1..close]);
    let tail = &header[close + 1..];

    let mut visibility = default_visibility;
    let mut mutability = StateMutability::Nonpayable;
    let mut modifiers = Vec::new();

    for token in signature_tokens(tail) {
        let root = token.split('(').next().unwrap_or("");
        match root {
            "public" => visibility = Visibility::Public,
            "external" => visibility = Visibility::External,
            "internal" => visibility = Visibility::Internal,
            "private" => visibility = Visibility::Private,
            "pure" => mutability = StateMutability::Pure,
            "view" | "constant" => mutability = StateMutability::View,
            "payable" => mutability = StateMutability::Payable,
            "virtual" | "override" | "returns" => {}
            _ => modifiers.push(root.to_string()),
        }
    }

    Ok(SignatureInfo {
        name,
        visibility,
        mutability,
        modifiers,
        params,
        is_constructor,
        is_receive_or_fallback,
    })
}

/// Finds the matching `)` for the paren at `open`.
pub(crate) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses a parameter list into (name, type) pairs.
fn parse_params(params: &str) -> Vec<Parameter> {
    params
        .split(',')
        .filter_map(|part| {
            let tokens: Vec<&str> = part.split_whitespace().collect();
            if tokens.is_empty() {
                return None;
            }
            let ty = tokens[0].to_string();
            let name = tokens
                .last()
                .filter(|&&last| {
                    tokens.len() >= 2
                        && is_identifier(last)
                        && !matches!(last, "memory" | "storage" | "calldata" | "payable")
                })
                .map(|s| s.to_string())
                .unwrap_or_default();
            Some(Parameter { name, ty })
        })
        .collect()
}

/// Tokenizes a signature tail into identifiers with optional attached
/// parenthesized groups (`override(Base)`, `returns (uint256)`,
/// `onlyRole(ADMIN)`).
fn signature_tokens(tail: &str) -> Vec<String> {
    let bytes = tail.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let mut end = i;

            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'(' {
                if let Some(close) = matching_paren(tail, j) {
                    end = close + 1;
                    i = close + 1;
                }
            }

            tokens.push(tail[start..end].to_string());
        } else {
            i += 1;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments_preserves_lines() {
        let mut issues = Vec::new();
        let source = "a // comment\nb /* multi\nline */ c";
        let stripped = strip_comments(source, &mut issues);

        assert!(issues.is_empty());
        assert_eq!(stripped.lines().count(), source.lines().count());
        assert!(!stripped.contains("comment"));
        assert!(stripped.contains('c'));
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let mut issues = Vec::new();
        let stripped = strip_comments(r#"require(x, "not // a comment");"#, &mut issues);
        assert!(stripped.contains("not // a comment"));
    }

    #[test]
    fn test_unterminated_comment_is_reported() {
        let mut issues = Vec::new();
        strip_comments("contract C { /* never closed", &mut issues);
        assert!(matches!(
            issues.first(),
            Some(ParseIssue::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn test_parse_state_variable_forms() {
        let var = parse_state_variable("uint256 public totalSupply;", 3).unwrap();
        assert_eq!(var.name, "totalSupply");
        assert_eq!(var.visibility, Visibility::Public);
        assert_eq!(var.mutability, VarMutability::Mutable);
        assert!(!var.has_initializer);

        let var = parse_state_variable(
            "mapping(address => uint256) private balances;",
            4,
        )
        .unwrap();
        assert_eq!(var.name, "balances");
        assert_eq!(var.visibility, Visibility::Private);
        assert!(var.ty.starts_with("mapping"));

        let var = parse_state_variable("uint256 public constant FEE = 100;", 5).unwrap();
        assert_eq!(var.mutability, VarMutability::Constant);
        assert!(var.has_initializer);

        let var = parse_state_variable("address public immutable deployer;", 6).unwrap();
        assert_eq!(var.mutability, VarMutability::Immutable);
    }

    #[test]
    fn test_parse_function_signature_full() {
        let sig = parse_function_signature(
            "function withdraw(uint256 amount) public payable onlyOwner returns (bool)",
            "Vault",
            10,
        )
        .unwrap();

        assert_eq!(sig.name, "withdraw");
        assert_eq!(sig.visibility, Visibility::Public);
        assert_eq!(sig.mutability, StateMutability::Payable);
        assert_eq!(sig.modifiers, vec!["onlyOwner".to_string()]);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "amount");
        assert_eq!(sig.params[0].ty, "uint256");
    }

    #[test]
    fn test_parse_receive_signature() {
        let sig = parse_function_signature("receive() external payable", "Vault", 2).unwrap();
        assert!(sig.is_receive_or_fallback);
        assert_eq!(sig.mutability, StateMutability::Payable);
        assert_eq!(sig.visibility, Visibility::External);
    }

    #[test]
    fn test_malformed_signature_is_issue() {
        assert!(parse_function_signature("function ???", "C", 1).is_err());
    }

    #[test]
    fn test_parse_heritage() {
        assert_eq!(
            parse_heritage("is Ownable, ReentrancyGuard(true) "),
            vec!["Ownable".to_string(), "ReentrancyGuard".to_string()]
        );
        assert!(parse_heritage("").is_empty());
    }
}
