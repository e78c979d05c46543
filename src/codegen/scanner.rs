//! Scanner for `require("...")` calls in CommonJS sources.
//!
//! Only the call form `require ( '<token>' )` is recognised. Comments, quoted strings,
//! regular expression literals and template literal text are skipped, template substitutions
//! are scanned as code. A `/` starts a regular expression when the previous significant token
//! cannot end an operand: punctuation other than `)` and `]`, an operator keyword, or the start
//! of the source.

use std::ops::Range;

use crate::error::Result;

const REQUIRE: &[u8] = b"require";

/// Keywords after which a `/` opens a regular expression rather than dividing.
const REGEX_KEYWORDS: [&str; 13] = [
  "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
  "else", "yield",
];

/// One recognised `require` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
  /// Text between the quotes.
  pub token: &'a str,
  /// Byte range of the whole call, from `require` to the closing parenthesis.
  pub span: Range<usize>,
}

/// Find every `require` call in `source`, in order of appearance.
pub fn scan_references(source: &str) -> Vec<Reference<'_>> {
  let bytes = source.as_bytes();
  let mut references = Vec::new();
  // Brace depth at which each open `${` substitution returns to template text.
  let mut substitutions: Vec<usize> = Vec::new();
  let mut depth = 0usize;
  let mut regex_allowed = true;
  let mut pos = 0;

  while pos < bytes.len() {
    let byte = bytes[pos];
    match byte {
      b'/' if bytes.get(pos + 1) == Some(&b'/') => pos = skip_line(bytes, pos),
      b'/' if bytes.get(pos + 1) == Some(&b'*') => pos = skip_block(bytes, pos + 2),
      b'/' if regex_allowed => {
        pos = skip_regex(bytes, pos + 1);
        regex_allowed = false;
      }
      quote @ (b'\'' | b'"') => {
        pos = skip_quoted(bytes, pos + 1, quote);
        regex_allowed = false;
      }
      b'`' => {
        let open = substitutions.len();
        pos = skip_template(bytes, pos + 1, &mut substitutions, depth);
        regex_allowed = substitutions.len() > open;
      }
      b'{' => {
        depth += 1;
        pos += 1;
        regex_allowed = true;
      }
      b'}' if substitutions.last() == Some(&depth) => {
        substitutions.pop();
        let open = substitutions.len();
        pos = skip_template(bytes, pos + 1, &mut substitutions, depth);
        regex_allowed = substitutions.len() > open;
      }
      b'}' => {
        depth = depth.saturating_sub(1);
        pos += 1;
        regex_allowed = true;
      }
      b')' | b']' => {
        pos += 1;
        regex_allowed = false;
      }
      _ if byte.is_ascii_whitespace() => pos += 1,
      _ if is_ident_byte(byte) => {
        if starts_call(bytes, pos)
          && let Some(reference) = parse_call(source, pos)
        {
          pos = reference.span.end;
          references.push(reference);
          regex_allowed = false;
          continue;
        }
        let end = word_end(bytes, pos);
        let word = &bytes[pos..end];
        regex_allowed = REGEX_KEYWORDS
          .iter()
          .any(|keyword| keyword.as_bytes() == word);
        pos = end;
      }
      _ => {
        pos += 1;
        regex_allowed = true;
      }
    }
  }

  references
}

/// Replace every `require` call for which `resolve` returns a name with `require("<name>")`.
///
/// Calls for which `resolve` returns `None` are copied unchanged, as is all other text. The
/// first error aborts the rewrite.
pub fn rewrite_references<F>(source: &str, mut resolve: F) -> Result<String>
where
  F: FnMut(&str) -> Result<Option<String>>,
{
  let mut output = String::with_capacity(source.len());
  let mut cursor = 0;

  for reference in scan_references(source) {
    let Some(name) = resolve(reference.token)? else {
      continue;
    };
    output.push_str(&source[cursor..reference.span.start]);
    output.push_str("require(\"");
    output.push_str(&name);
    output.push_str("\")");
    cursor = reference.span.end;
  }

  output.push_str(&source[cursor..]);
  Ok(output)
}

fn is_ident_byte(byte: u8) -> bool {
  byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

fn starts_call(bytes: &[u8], pos: usize) -> bool {
  if !bytes[pos..].starts_with(REQUIRE) {
    return false;
  }
  let preceded = pos
    .checked_sub(1)
    .is_some_and(|prev| is_ident_byte(bytes[prev]) || bytes[prev] == b'.');
  let followed = bytes
    .get(pos + REQUIRE.len())
    .is_some_and(|&next| is_ident_byte(next));
  !preceded && !followed
}

fn parse_call(source: &str, start: usize) -> Option<Reference<'_>> {
  let bytes = source.as_bytes();
  let mut pos = skip_whitespace(bytes, start + REQUIRE.len());
  if bytes.get(pos) != Some(&b'(') {
    return None;
  }

  pos = skip_whitespace(bytes, pos + 1);
  let quote = *bytes.get(pos)?;
  if quote != b'\'' && quote != b'"' {
    return None;
  }

  let token_start = pos + 1;
  let len = bytes[token_start..]
    .iter()
    .position(|&byte| byte == quote || byte == b'\\' || byte == b'\n')?;
  let token_end = token_start + len;
  if len == 0 || bytes[token_end] != quote {
    return None;
  }

  pos = skip_whitespace(bytes, token_end + 1);
  if bytes.get(pos) != Some(&b')') {
    return None;
  }

  Some(Reference {
    token: &source[token_start..token_end],
    span: start..pos + 1,
  })
}

fn word_end(bytes: &[u8], pos: usize) -> usize {
  bytes[pos..]
    .iter()
    .position(|&byte| !is_ident_byte(byte))
    .map_or(bytes.len(), |offset| pos + offset)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
  while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
    pos += 1;
  }
  pos
}

fn skip_line(bytes: &[u8], pos: usize) -> usize {
  bytes[pos..]
    .iter()
    .position(|&byte| byte == b'\n')
    .map_or(bytes.len(), |offset| pos + offset)
}

fn skip_block(bytes: &[u8], pos: usize) -> usize {
  bytes[pos.min(bytes.len())..]
    .windows(2)
    .position(|window| window == b"*/")
    .map_or(bytes.len(), |offset| pos + offset + 2)
}

fn skip_quoted(bytes: &[u8], mut pos: usize, quote: u8) -> usize {
  while let Some(&byte) = bytes.get(pos) {
    match byte {
      b'\\' => pos += 2,
      b'\n' => return pos,
      _ if byte == quote => return pos + 1,
      _ => pos += 1,
    }
  }
  bytes.len()
}

/// Skip a regular expression body starting after its opening `/`, character classes included.
fn skip_regex(bytes: &[u8], mut pos: usize) -> usize {
  let mut in_class = false;
  while let Some(&byte) = bytes.get(pos) {
    match byte {
      b'\\' => pos += 2,
      b'\n' => return pos,
      b'[' => {
        in_class = true;
        pos += 1;
      }
      b']' => {
        in_class = false;
        pos += 1;
      }
      b'/' if !in_class => return pos + 1,
      _ => pos += 1,
    }
  }
  bytes.len()
}

fn skip_template(bytes: &[u8], mut pos: usize, substitutions: &mut Vec<usize>, depth: usize) -> usize {
  while let Some(&byte) = bytes.get(pos) {
    match byte {
      b'\\' => pos += 2,
      b'`' => return pos + 1,
      b'$' if bytes.get(pos + 1) == Some(&b'{') => {
        substitutions.push(depth);
        return pos + 2;
      }
      _ => pos += 1,
    }
  }
  bytes.len()
}
