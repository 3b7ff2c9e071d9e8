//! go.mod parser with position tracking.
//!
//! Parses go.mod files line by line into a [`ModFile`] whose directives keep
//! the byte span and raw tokens of their source line. The spans exclude
//! trailing whitespace and comments, so the last token of a require or
//! versioned replace line is exactly the version text in the document.
//!
//! # Key Features
//!
//! - Single-line and parenthesized block forms for every block directive
//! - Double-quoted and back-quoted tokens
//! - `//` comments, including `// indirect` markers on require lines
//! - Strict validation: unknown directives, malformed arguments and
//!   non-canonical versions are reported with their line number

use crate::error::{GoModError, Result};
use crate::types::{Exclude, Line, ModFile, ModuleDirective, ModuleVersion, Replace, Require};
use gomod_core::PositionMapper;
use once_cell::sync::Lazy;
use regex::Regex;

/// Result of parsing a go.mod file.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    /// Directive tree
    pub file: ModFile,
    /// Position mapper bound to the parsed text
    pub mapper: PositionMapper,
}

impl ParsedModule {
    /// Text the module was parsed from.
    pub fn content(&self) -> &str {
        self.mapper.content()
    }
}

/// Directives that accept the `verb ( ... )` block form.
const BLOCK_DIRECTIVES: &[&str] = &[
    "godebug", "require", "exclude", "replace", "retract", "tool", "ignore",
];

/// Directives recognised but not interpreted.
const OPAQUE_DIRECTIVES: &[&str] = &["godebug", "retract", "tool", "ignore"];

/// A token with its absolute byte span.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

/// A lexed source line.
struct LexedLine<'a> {
    number: usize,
    tokens: Vec<Token<'a>>,
    comment: Option<&'a str>,
}

impl LexedLine<'_> {
    fn to_syntax(&self) -> Line {
        Line {
            start: self.tokens.first().map_or(0, |t| t.start),
            end: self.tokens.last().map_or(0, |t| t.end),
            tokens: self.tokens.iter().map(|t| t.text.to_string()).collect(),
            line_number: self.number,
            comment: self.comment.map(|c| c.trim().to_string()),
        }
    }
}

/// Parses a go.mod file into its directive tree.
///
/// # Errors
///
/// Returns [`GoModError::ParseError`] for the first malformed line.
///
/// # Examples
///
/// ```
/// use gomod_hints::parse_go_mod;
///
/// let parsed = parse_go_mod("module example.com/app\n\nrequire example.com/foo v1.0.0\n").unwrap();
/// assert_eq!(parsed.file.require.len(), 1);
/// assert_eq!(parsed.file.require[0].syntax.last_token(), "v1.0.0");
/// ```
pub fn parse_go_mod(content: &str) -> Result<ParsedModule> {
    let mut file = ModFile::default();
    let mut block: Option<(&str, usize)> = None;
    let mut line_offset = 0;

    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let number = index + 1;
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let line = lex_line(text, line_offset, number)?;
        line_offset += raw.len();

        if line.tokens.is_empty() {
            continue;
        }

        if let Some((verb, _)) = block {
            if line.tokens[0].text == ")" {
                if line.tokens.len() > 1 {
                    return Err(GoModError::parse(number, "unexpected token after ')'"));
                }
                block = None;
                continue;
            }
            if line.tokens.iter().any(|t| matches!(t.text, "(" | ")")) {
                return Err(GoModError::parse(number, "unexpected parenthesis"));
            }
            apply_directive(&mut file, verb, &line, 0)?;
            continue;
        }

        let verb = line.tokens[0].text;
        if !is_known_directive(verb) {
            return Err(GoModError::parse(
                number,
                format!("unknown directive: {}", verb),
            ));
        }

        if line.tokens.len() == 2 && line.tokens[1].text == "(" {
            if !BLOCK_DIRECTIVES.contains(&verb) {
                return Err(GoModError::parse(
                    number,
                    format!("{} does not support block syntax", verb),
                ));
            }
            block = Some((verb, number));
            continue;
        }

        if line.tokens.iter().any(|t| matches!(t.text, "(" | ")")) {
            return Err(GoModError::parse(number, "unexpected parenthesis"));
        }

        apply_directive(&mut file, verb, &line, 1)?;
    }

    if let Some((verb, number)) = block {
        return Err(GoModError::parse(
            number,
            format!("unterminated {} block", verb),
        ));
    }

    tracing::debug!(
        module = ?file.module.as_ref().map(|m| m.path.as_str()),
        go_version = ?file.go,
        requires = file.require.len(),
        replaces = file.replace.len(),
        excludes = file.exclude.len(),
        "Parsed go.mod successfully"
    );

    Ok(ParsedModule {
        file,
        mapper: PositionMapper::new(content),
    })
}

fn is_known_directive(verb: &str) -> bool {
    matches!(verb, "module" | "go" | "toolchain")
        || BLOCK_DIRECTIVES.contains(&verb)
}

/// Splits one line of text into tokens and a trailing comment.
///
/// `//` ends a bare word and starts a comment, except right after `:` so
/// URL-like tokens such as `https://host/path` stay intact.
fn lex_line(text: &str, line_start: usize, number: usize) -> Result<LexedLine<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut comment = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b' ' || b == b'\t' || b == b'\r' {
            i += 1;
            continue;
        }

        let start = i;
        if bytes[i..].starts_with(b"//") {
            comment = Some(&text[i + 2..]);
            break;
        } else if b == b'(' || b == b')' {
            i += 1;
        } else if bytes[i..].starts_with(b"=>") {
            i += 2;
        } else if b == b'"' {
            i = scan_quoted(bytes, i, b'"', true)
                .ok_or_else(|| GoModError::parse(number, "unterminated quoted string"))?;
        } else if b == b'`' {
            i = scan_quoted(bytes, i, b'`', false)
                .ok_or_else(|| GoModError::parse(number, "unterminated raw string"))?;
        } else {
            while i < bytes.len() && !is_token_boundary(bytes, i) {
                i += 1;
            }
        }

        tokens.push(Token {
            text: &text[start..i],
            start: line_start + start,
            end: line_start + i,
        });
    }

    Ok(LexedLine {
        number,
        tokens,
        comment,
    })
}

/// Returns the index just past the closing quote, if there is one.
fn scan_quoted(bytes: &[u8], open: usize, quote: u8, escapes: bool) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        if escapes && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// Bare words stop only at ASCII bytes, so every token ends on a char
/// boundary.
fn is_token_boundary(bytes: &[u8], i: usize) -> bool {
    matches!(bytes[i], b' ' | b'\t' | b'\r' | b'(' | b')' | b'"' | b'`')
        || bytes[i..].starts_with(b"=>")
        || (bytes[i..].starts_with(b"//") && i > 0 && bytes[i - 1] != b':')
}

/// Removes quoting from a token.
fn unquote(token: &str, number: usize) -> Result<String> {
    if token.starts_with('"') {
        serde_json::from_str::<String>(token)
            .map_err(|_| GoModError::parse(number, format!("invalid quoted string {}", token)))
    } else if let Some(raw) = token.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
        Ok(raw.to_string())
    } else {
        Ok(token.to_string())
    }
}

/// Interprets one directive. `skip` is the number of leading tokens that are
/// the verb (1 on a single-line directive, 0 inside a block).
fn apply_directive(file: &mut ModFile, verb: &str, line: &LexedLine<'_>, skip: usize) -> Result<()> {
    let number = line.number;
    let args: Vec<&str> = line.tokens[skip..].iter().map(|t| t.text).collect();

    match verb {
        "module" => {
            if file.module.is_some() {
                return Err(GoModError::parse(number, "repeated module statement"));
            }
            let [path] = args.as_slice() else {
                return Err(GoModError::parse(number, "usage: module module/path"));
            };
            file.module = Some(ModuleDirective {
                path: unquote(path, number)?,
                syntax: line.to_syntax(),
            });
        }
        "go" => {
            if file.go.is_some() {
                return Err(GoModError::parse(number, "repeated go statement"));
            }
            let [version] = args.as_slice() else {
                return Err(GoModError::parse(number, "usage: go 1.23"));
            };
            static GO_VERSION: Lazy<Regex> = Lazy::new(|| {
                Regex::new(r"^([1-9][0-9]*)\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$")
                    .unwrap()
            });
            if !GO_VERSION.is_match(version) {
                return Err(GoModError::parse(
                    number,
                    format!("invalid go version '{}': must match format 1.23.0", version),
                ));
            }
            file.go = Some((*version).to_string());
        }
        "toolchain" => {
            let [name] = args.as_slice() else {
                return Err(GoModError::parse(number, "usage: toolchain go1.21.0"));
            };
            file.toolchain = Some(unquote(name, number)?);
        }
        "require" | "exclude" => {
            let [path, version] = args.as_slice() else {
                return Err(GoModError::parse(
                    number,
                    format!("usage: {} module/path v1.2.3", verb),
                ));
            };
            let module = ModuleVersion::new(
                unquote(path, number)?,
                parse_version(version, number)?,
            );
            let syntax = line.to_syntax();
            if verb == "require" {
                let indirect = syntax.comment.as_deref().is_some_and(is_indirect_comment);
                file.require.push(Require {
                    module,
                    indirect,
                    syntax,
                });
            } else {
                file.exclude.push(Exclude { module, syntax });
            }
        }
        "replace" => {
            file.replace.push(parse_replace(&args, line)?);
        }
        _ if OPAQUE_DIRECTIVES.contains(&verb) => {
            if args.is_empty() {
                return Err(GoModError::parse(number, format!("usage: {} ...", verb)));
            }
        }
        _ => {
            return Err(GoModError::parse(
                number,
                format!("unknown directive: {}", verb),
            ));
        }
    }

    Ok(())
}

fn parse_replace(args: &[&str], line: &LexedLine<'_>) -> Result<Replace> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4 \
                         or replace module/path [v1.2.3] => ../local/directory";
    let number = line.number;

    let arrow = args
        .iter()
        .position(|a| *a == "=>")
        .ok_or_else(|| GoModError::parse(number, USAGE))?;
    let (left, right) = (&args[..arrow], &args[arrow + 1..]);

    let old = match left {
        [path] => ModuleVersion::new(unquote(path, number)?, ""),
        [path, version] => {
            ModuleVersion::new(unquote(path, number)?, parse_version(version, number)?)
        }
        _ => return Err(GoModError::parse(number, USAGE)),
    };

    let new = match right {
        [path] => {
            let path = unquote(path, number)?;
            if !is_directory_path(&path) {
                return Err(GoModError::parse(
                    number,
                    "replacement module without version must be directory path \
                     (rooted or starting with ./ or ../)",
                ));
            }
            ModuleVersion::new(path, "")
        }
        [path, version] => {
            let path = unquote(path, number)?;
            if is_directory_path(&path) {
                return Err(GoModError::parse(
                    number,
                    format!("replacement module directory path {} cannot have version", path),
                ));
            }
            ModuleVersion::new(path, parse_version(version, number)?)
        }
        _ => return Err(GoModError::parse(number, USAGE)),
    };

    Ok(Replace {
        old,
        new,
        syntax: line.to_syntax(),
    })
}

/// Validates a module version token.
fn parse_version(token: &str, number: usize) -> Result<String> {
    static MODULE_VERSION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
        )
        .unwrap()
    });

    let version = unquote(token, number)?;
    if !MODULE_VERSION.is_match(&version) {
        return Err(GoModError::parse(
            number,
            format!("invalid module version {}: must be of the form v1.2.3", version),
        ));
    }
    Ok(version)
}

/// Reports whether `path` names a directory rather than a module.
fn is_directory_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path == "."
        || path == ".."
        || path.starts_with(".\\")
        || path.starts_with("..\\")
        || path.starts_with('\\')
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && matches!(bytes[2], b'\\' | b'/'))
}

fn is_indirect_comment(comment: &str) -> bool {
    comment == "indirect" || comment.starts_with("indirect;")
}
