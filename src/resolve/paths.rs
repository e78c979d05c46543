//! Path arithmetic for branch-relative references.
//!
//! Joining never touches the filesystem. These helpers only deal with `/`-separated paths;
//! absolute URLs are joined with the `url` crate where they occur.

use std::sync::OnceLock;

use regex::Regex;

fn scheme_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("invalid scheme regex"))
}

fn extension_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\.\w+$").expect("invalid extension regex"))
}

/// Whether `value` carries a URL scheme such as `https:` or `data:`.
pub fn has_scheme(value: &str) -> bool {
  scheme_pattern().is_match(value)
}

/// Remove a trailing `.<word>` extension: `lib/a.min.js` -> `lib/a.min`.
pub fn strip_extension(path: &str) -> &str {
  match extension_pattern().find(path) {
    Some(found) => &path[..found.start()],
    None => path,
  }
}

/// Join `reference` onto the directory of the `/`-separated path `base`.
///
/// `.` and `..` segments are collapsed. A relative base keeps `..` segments that climb above
/// it, a root-relative one drops them. A root-relative reference replaces the base path.
/// A `?query` or `#fragment` on the reference is carried over unchanged.
pub fn join_path(base: &str, reference: &str) -> String {
  let (base, _) = split_suffix(base);
  let (reference, suffix) = split_suffix(reference);
  if reference.is_empty() {
    return format!("{base}{suffix}");
  }

  let absolute = base.starts_with('/') || reference.starts_with('/');
  let joined = if reference.starts_with('/') {
    reference.to_string()
  } else {
    let directory = match base.rfind('/') {
      Some(index) => &base[..=index],
      None => "",
    };
    format!("{directory}{reference}")
  };

  format!("{}{suffix}", normalise(&joined, absolute))
}

/// Split a trailing `?query` or `#fragment` off a path.
fn split_suffix(value: &str) -> (&str, &str) {
  match value.find(['?', '#']) {
    Some(index) => (&value[..index], &value[index..]),
    None => (value, ""),
  }
}

/// Collapse `.` and `..` segments of a `/`-separated path.
fn normalise(path: &str, absolute: bool) -> String {
  let mut segments: Vec<&str> = Vec::new();
  let raw: Vec<&str> = path.split('/').collect();
  let last = raw.len().saturating_sub(1);
  let mut trailing_slash = false;

  for (index, segment) in raw.iter().enumerate() {
    let is_last = index == last;
    match *segment {
      "." => trailing_slash = is_last,
      ".." => {
        match segments.last() {
          Some(previous) if *previous != ".." => {
            segments.pop();
          }
          _ if !absolute => segments.push(".."),
          _ => {}
        }
        trailing_slash = is_last;
      }
      "" => trailing_slash = is_last && index > 0,
      other => {
        segments.push(other);
        trailing_slash = false;
      }
    }
  }

  let mut result = segments.join("/");
  if absolute {
    result.insert(0, '/');
  }
  if trailing_slash && !result.ends_with('/') {
    result.push('/');
  }
  result
}
