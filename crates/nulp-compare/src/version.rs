//! Version values for reference file names.
//!
//! Accepts semantic versions (`2.0.0-rc.1+build.5`) and the PEP 440 forms
//! result files are usually tagged with (`v1.0`, `1.0rc1`, `1.0.post1`,
//! `1.0.dev0`). Parsing is strict: anything that is not a well-formed
//! version is an error, never a fallback to string comparison.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,

    #[error("invalid release component {component:?} in {input:?}")]
    InvalidRelease { input: String, component: String },

    #[error("invalid identifier {identifier:?} in {input:?}")]
    InvalidIdentifier { input: String, identifier: String },
}

/// A pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl Identifier {
    fn alpha(text: &str) -> Self {
        Identifier::Alpha(text.to_string())
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::Alpha(_)) => Ordering::Less,
            (Identifier::Alpha(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::Alpha(a), Identifier::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Display for Identifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Alpha(s) => write!(f, "{}", s),
        }
    }
}

/// A parsed version such as `1.10.0`, `2.0.0-rc.1`, `0.3rc10` or `1.2.post1`.
///
/// Release components compare numerically with implicit trailing zeros, so
/// `1.2` and `1.2.0` are equal. Within one release the order is
/// `dev` < pre-release < release < `post`. Pre-release identifiers are split
/// into letter and digit runs, so `rc9 < rc10`. Build metadata is kept for
/// display but never affects ordering.
#[derive(Debug, Clone)]
pub struct Version {
    pub release: Vec<u64>,
    pub pre: Vec<Identifier>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub build: Vec<String>,
    text: String,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Release,
    Pre,
    Post,
    Dev,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.is_empty() {
            return Err(VersionError::Empty);
        }
        let (main, build) = match input.split_once('+') {
            Some((main, build)) => (main, Some(build)),
            None => (input, None),
        };
        let main = match main.strip_prefix(['v', 'V']) {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => main,
        };

        let (release_text, rest) = split_release(main);
        let release = release_text
            .split('.')
            .map(|component| {
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::InvalidRelease {
                        input: input.to_string(),
                        component: component.to_string(),
                    });
                }
                component.parse::<u64>().map_err(|_| VersionError::InvalidRelease {
                    input: input.to_string(),
                    component: component.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut version = Self {
            release,
            pre: Vec::new(),
            post: None,
            dev: None,
            build: Vec::new(),
            text: input.to_string(),
        };

        if let Some(pre_text) = rest.strip_prefix('-') {
            for id in split_identifiers(input, pre_text)? {
                version.pre.extend(split_runs(input, id)?);
            }
        } else {
            version.parse_suffixes(input, rest)?;
        }

        if let Some(text) = build {
            version.build = split_identifiers(input, text)?
                .into_iter()
                .map(str::to_string)
                .collect();
        }
        Ok(version)
    }

    /// PEP 440 suffixes in their fixed order: pre, post, dev.
    fn parse_suffixes(&mut self, input: &str, mut rest: &str) -> Result<(), VersionError> {
        let mut phase = Phase::Release;
        while !rest.is_empty() {
            let invalid = || VersionError::InvalidIdentifier {
                input: input.to_string(),
                identifier: rest.to_string(),
            };
            let body = rest.strip_prefix(['.', '_', '-']).unwrap_or(rest);
            let word_end = body
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(body.len());
            let (word, after) = body.split_at(word_end);
            let digits = after.strip_prefix(['.', '_', '-']).unwrap_or(after);
            let number_end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let (number, next) = if number_end == 0 {
                (0, after)
            } else {
                let number = digits[..number_end].parse::<u64>().map_err(|_| invalid())?;
                (number, &digits[number_end..])
            };

            let (kind, tag) = match word.to_ascii_lowercase().as_str() {
                "a" | "alpha" => (Phase::Pre, "a"),
                "b" | "beta" => (Phase::Pre, "b"),
                "c" | "rc" | "pre" | "preview" => (Phase::Pre, "rc"),
                "post" | "rev" | "r" => (Phase::Post, ""),
                "dev" => (Phase::Dev, ""),
                _ => return Err(invalid()),
            };
            if kind <= phase {
                return Err(invalid());
            }
            match kind {
                Phase::Pre => {
                    self.pre = vec![Identifier::alpha(tag), Identifier::Numeric(number)];
                }
                Phase::Post => self.post = Some(number),
                Phase::Dev => self.dev = Some(number),
                Phase::Release => {}
            }
            phase = kind;
            rest = next;
        }
        Ok(())
    }

    fn release_at(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }
}

/// Split off the release part: digits and dots, up to a dot that starts a
/// lettered suffix such as `.post1`.
fn split_release(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let end = (0..bytes.len())
        .find(|&i| match bytes[i] {
            b'.' => bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic),
            b => !b.is_ascii_digit(),
        })
        .unwrap_or(bytes.len());
    text.split_at(end)
}

fn split_identifiers<'a>(input: &str, text: &'a str) -> Result<Vec<&'a str>, VersionError> {
    text.split('.')
        .map(|id| {
            if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
                Err(VersionError::InvalidIdentifier {
                    input: input.to_string(),
                    identifier: id.to_string(),
                })
            } else {
                Ok(id)
            }
        })
        .collect()
}

/// Break an alphanumeric identifier into letter and digit runs.
///
/// Identifiers containing `-` stay whole.
fn split_runs(input: &str, id: &str) -> Result<Vec<Identifier>, VersionError> {
    if id.contains('-') {
        return Ok(vec![Identifier::alpha(id)]);
    }
    let mut runs = Vec::new();
    let mut start = 0;
    let bytes = id.as_bytes();
    for end in 1..=bytes.len() {
        if end < bytes.len() && bytes[end].is_ascii_digit() == bytes[start].is_ascii_digit() {
            continue;
        }
        let run = &id[start..end];
        if bytes[start].is_ascii_digit() {
            let number = run.parse::<u64>().map_err(|_| VersionError::InvalidIdentifier {
                input: input.to_string(),
                identifier: id.to_string(),
            })?;
            runs.push(Identifier::Numeric(number));
        } else {
            runs.push(Identifier::alpha(run));
        }
        start = end;
    }
    Ok(runs)
}

/// Where the pre-release part sorts: a bare dev release sorts before every
/// pre-release of the same release, a final release after them.
fn pre_rank(version: &Version) -> (u8, &[Identifier]) {
    if !version.pre.is_empty() {
        (1, &version.pre)
    } else if version.post.is_none() && version.dev.is_some() {
        (0, &[])
    } else {
        (2, &[])
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.release.len().max(other.release.len());
        for i in 0..width {
            match self.release_at(i).cmp(&other.release_at(i)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        pre_rank(self)
            .cmp(&pre_rank(other))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| match (self.dev, other.dev) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Version::parse(s)
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
