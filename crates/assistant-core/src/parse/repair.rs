/// Best-effort rewrite of JavaScript-style object literals into JSON.
///
/// Handles the deviations models commonly produce:
/// - unquoted keys (`{reply: ...}`),
/// - single-quoted keys and string values (`'...'`),
/// - trailing commas before `}` or `]`.
///
/// Double-quoted strings are copied verbatim, so colons, commas and quotes
/// inside them are left alone. The output is not guaranteed to be valid JSON.
pub fn relax_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    // Last non-whitespace character emitted outside of a string literal.
    let mut last_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                i = copy_double_quoted(&chars, i, &mut out);
                last_significant = Some('"');
            }
            '\'' => {
                i = copy_single_quoted(&chars, i, &mut out);
                last_significant = Some('"');
            }
            ',' if matches!(next_significant(&chars, i + 1), Some('}') | Some(']')) => {
                i += 1;
            }
            c if is_ident_char(c) && matches!(last_significant, Some('{') | Some(',')) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                if next_significant(&chars, i) == Some(':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                last_significant = Some(chars[i - 1]);
            }
            c => {
                out.push(c);
                if !c.is_whitespace() {
                    last_significant = Some(c);
                }
                i += 1;
            }
        }
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars.iter().skip(from).copied().find(|c| !c.is_whitespace())
}

/// Copy a double-quoted literal starting at `start`; returns the index after it.
fn copy_double_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        if c == '\\' && i + 1 < chars.len() {
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        i += 1;
        if c == '"' {
            break;
        }
    }
    i
}

/// Rewrite a single-quoted literal starting at `start` as a double-quoted one.
fn copy_single_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if i + 1 < chars.len() => {
                let next = chars[i + 1];
                if next != '\'' {
                    out.push('\\');
                }
                out.push(next);
                i += 2;
                continue;
            }
            '\'' => {
                out.push('"');
                return i + 1;
            }
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
        i += 1;
    }
    i
}
