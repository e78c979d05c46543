//! Stylesheet stage rewriting `url(...)` references to public asset URLs.

use std::sync::OnceLock;

use log::trace;
use regex::{Captures, Regex};
use url::Url;

use crate::files::{Contents, FileRecord};
use crate::plugins::{Transform, TransformContext};
use crate::resolve::paths::{has_scheme, join_path};

fn url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\burl *\(([^)]+)\)").expect("invalid url() regex"))
}

/// Rewrites relative `url(...)` references of `.css` files against the public URL prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlRewrite;

impl Transform for UrlRewrite {
  fn transform(&self, context: &TransformContext<'_, '_>, file: &mut FileRecord) -> anyhow::Result<()> {
    if file.extension != "css" {
      return Ok(());
    }

    let base = format!(
      "{}{}/",
      context.options.url_prefix,
      context.branch.branch.id.asset_segment()
    );
    let path = file.path.clone();
    let text = rewrite_urls(file.read(context.reader)?, &path, &base);
    file.contents = Contents::Text(text);
    Ok(())
  }
}

/// Rewrite every relative `url(...)` in `css`, written at branch-relative `path`, onto `base`.
///
/// Data URIs, scheme-qualified and root-relative references are kept exactly as written.
/// Rewritten references are always double-quoted. An absolute `base` is joined as a URL,
/// anything else as a plain path.
pub fn rewrite_urls(css: &str, path: &str, base: &str) -> String {
  let public = Url::parse(base).ok();
  url_pattern()
    .replace_all(css, |caps: &Captures<'_>| {
      let original = &caps[0];
      let uri = strip_quotes(&caps[1]);
      if uri.is_empty() || is_data(uri) || is_absolute(uri) {
        return original.to_string();
      }

      let rewritten = match &public {
        Some(public) => match public.join(path).and_then(|file| file.join(uri)) {
          Ok(url) => url.to_string(),
          Err(err) => {
            trace!("{path}: keeping url({uri}): {err}");
            return original.to_string();
          }
        },
        None => join_path(&join_path(base, path), uri),
      };
      trace!("{path}: url({uri}) -> {rewritten}");
      format!("url(\"{rewritten}\")")
    })
    .into_owned()
}

fn strip_quotes(value: &str) -> &str {
  let value = value.trim();
  for quote in ['"', '\''] {
    if let Some(inner) = value
      .strip_prefix(quote)
      .and_then(|rest| rest.strip_suffix(quote))
    {
      return inner;
    }
  }
  value
}

fn is_data(uri: &str) -> bool {
  uri.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

fn is_absolute(uri: &str) -> bool {
  uri.starts_with('/') || has_scheme(uri)
}
