//! Shell-style command line tokenizer
//!
//! Splits a full command string into the argument vector used to replace a
//! container's entrypoint. Quoting follows the usual shell conventions:
//! single and double quotes group whitespace, a backslash escapes the next
//! character outside quotes and escapes `"` and `\` inside double quotes.
//! An unterminated quote consumes the remainder of the string.

/// Tokenize a command string into arguments
///
/// Pure function with no failure modes; an empty or all-whitespace input
/// yields an empty vector.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    current.push(c);
                }
            }
            '"' => {
                in_token = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(escaped @ ('"' | '\\')) => current.push(escaped),
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => current.push('\\'),
                        },
                        _ => current.push(c),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
            }
            _ => {
                in_token = true;
                current.push(ch);
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}
