//! Literal-to-matcher compilation.
//!
//! A literal containing any of `! ? * [ ] { }` compiles to a glob over
//! `/`-separated paths. A single `*` never crosses `/`. A `**` crosses `/`
//! wherever it appears: as a whole segment (`a/**/b`, `**/*.go`, `pkg/**`)
//! and inside a segment (`cmd**.go`, `src/**_gen.go`), where it matches any
//! run of characters including `/`.
//!
//! Any other literal is a plain string tested by raw string prefix, so `net`
//! matches `net`, `net/http` and also `netflix.com/api`. Write `net/` or
//! `net$` to narrow it.
//!
//! Import patterns (allow entries and deny keys) are open-ended unless they
//! end in `$`: `pkg` matches anything starting with `pkg`, while `pkg$`
//! matches only `pkg`.

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::RuleError;

/// Characters that turn a literal into a glob.
pub const GLOB_META: &[char] = &['!', '?', '*', '[', ']', '{', '}'];

/// Trailing character that anchors an import pattern to an exact match.
pub const EXACT_SIGIL: char = '$';

/// Returns true if `literal` contains a glob metacharacter.
#[must_use]
pub fn is_glob(literal: &str) -> bool {
    literal.contains(GLOB_META)
}

/// How a compiled pattern tests candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Plain literal tested with `starts_with`.
    Prefix,
    /// Plain literal that must equal the candidate.
    Exact,
    /// Glob set.
    Glob,
}

#[derive(Debug, Clone)]
enum Matcher {
    Prefix(String),
    Exact(String),
    Glob(GlobSet),
}

/// A compiled pattern together with the literal it was built from.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    matcher: Matcher,
}

impl Pattern {
    /// Compiles a file-applicability literal (without its `!` negation).
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::PatternSyntax`] if the glob grammar rejects it.
    pub fn file(literal: &str) -> Result<Self, RuleError> {
        let matcher = if is_glob(literal) {
            Matcher::Glob(build_glob_set(literal, &[literal])?)
        } else {
            Matcher::Prefix(literal.to_string())
        };
        Ok(Self {
            source: literal.to_string(),
            matcher,
        })
    }

    /// Compiles an allow entry or deny key.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::PatternSyntax`] if the glob grammar rejects it.
    pub fn import(literal: &str) -> Result<Self, RuleError> {
        let (body, exact) = match literal.strip_suffix(EXACT_SIGIL) {
            Some(body) => (body, true),
            None => (literal, false),
        };

        let matcher = if is_glob(body) {
            if exact {
                Matcher::Glob(build_glob_set(literal, &[body])?)
            } else {
                let globs = continuation_globs(body);
                let refs: Vec<&str> = globs.iter().map(String::as_str).collect();
                Matcher::Glob(build_glob_set(literal, &refs)?)
            }
        } else if exact {
            Matcher::Exact(body.to_string())
        } else {
            Matcher::Prefix(body.to_string())
        };

        Ok(Self {
            source: literal.to_string(),
            matcher,
        })
    }

    /// Tests whether `candidate` matches this pattern.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Matcher::Exact(exact) => candidate == exact,
            Matcher::Glob(set) => set.is_match(candidate),
        }
    }

    /// Returns the literal this pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns how this pattern matches.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self.matcher {
            Matcher::Prefix(_) => PatternKind::Prefix,
            Matcher::Exact(_) => PatternKind::Exact,
            Matcher::Glob(_) => PatternKind::Glob,
        }
    }

    /// Specificity used to arbitrate between an allow and a deny match.
    ///
    /// Longer source literals are considered more specific.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.source.len()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.kind() == other.kind()
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Globs equivalent to `body` followed by any continuation.
fn continuation_globs(body: &str) -> Vec<String> {
    if body == "**" || body.ends_with("/**") {
        return vec![body.to_string()];
    }
    vec![format!("{body}*"), format!("{body}*/**")]
}

/// Rewrites every `**` that does not span a whole segment into globs
/// `globset` understands.
///
/// `globset` only treats `**` as recursive between separators (or at either
/// end of the glob); elsewhere it degrades to `*`. `a**b` is therefore split
/// into `a*b` (no `/` in between) and `a*/**/*b` (at least one `/`). Each such
/// occurrence doubles the number of globs.
fn expand_double_star(glob: &str) -> Vec<String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut variants = vec![String::new()];
    let push = |variants: &mut Vec<String>, text: &str| {
        for v in variants.iter_mut() {
            v.push_str(text);
        }
    };

    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            let escaped: String = chars[i..(i + 2).min(chars.len())].iter().collect();
            push(&mut variants, &escaped);
            i += 2;
            continue;
        }
        if in_class {
            in_class = c != ']';
            push(&mut variants, c.encode_utf8(&mut [0; 4]));
            i += 1;
            continue;
        }
        if c == '[' {
            in_class = true;
            push(&mut variants, "[");
            i += 1;
            continue;
        }
        if c != '*' {
            push(&mut variants, c.encode_utf8(&mut [0; 4]));
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i] == '*' {
            i += 1;
        }
        let run = i - start;
        let whole_segment =
            (start == 0 || chars[start - 1] == '/') && (i == chars.len() || chars[i] == '/');
        if run >= 2 && !whole_segment {
            variants = variants
                .into_iter()
                .flat_map(|v| [format!("{v}*"), format!("{v}*/**/*")])
                .collect();
        } else {
            push(&mut variants, &"*".repeat(run));
        }
    }

    variants
}

fn build_glob_set(source: &str, globs: &[&str]) -> Result<GlobSet, RuleError> {
    let syntax_error = |e: globset::Error| RuleError::PatternSyntax {
        pattern: source.to_string(),
        reason: e.kind().to_string(),
    };

    let mut builder = GlobSetBuilder::new();
    for glob in globs.iter().flat_map(|g| expand_double_star(g)) {
        let compiled = GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .map_err(syntax_error)?;
        builder.add(compiled);
    }
    builder.build().map_err(syntax_error)
}
