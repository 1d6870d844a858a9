//! Version extraction and range matching
//!
//! Probe commands print free-form text (`v18.17.0`, `git version 2.39.2`,
//! `Python 3.11.5`). [`Version::extract`] pulls the first version-looking
//! token out of that text and [`VersionReq`] matches it against an npm-style
//! range such as `>=18`, `^1.2.0`, `1.x || 2.x` or `1.2.3 - 2.0.0`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z][0-9A-Za-z.-]*))?").unwrap()
});

static COMPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\^|~>|~|>=|<=|>|<|=)?\s*v?(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?(?:-([0-9A-Za-z][0-9A-Za-z.-]*))?(?:\+[0-9A-Za-z.-]+)?",
    )
    .unwrap()
});

static HYPHEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());

/// A concrete `major.minor.patch[-pre]` version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// First version token found in `text`, missing components read as zero
    pub fn extract(text: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(text)?;
        let number = |i: usize| -> Option<u64> {
            caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
        };
        Some(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_pre_release(a, b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        let ord = version.cmp(&self.version);
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Gte => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Lte => ord != Ordering::Greater,
        }
    }
}

/// A version with wildcard or omitted components, as written in a range.
/// Every present component is below `u64::MAX`.
#[derive(Debug, Clone)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Option<String>,
}

impl Partial {
    fn from_captures(caps: &regex::Captures<'_>, first: usize) -> Option<Self> {
        let component = |i: usize| -> Option<Option<u64>> {
            match caps.get(i).map(|m| m.as_str()) {
                None | Some("x") | Some("X") | Some("*") => Some(None),
                // A component needs a successor, ceilings add one to it
                Some(digits) => digits
                    .parse::<u64>()
                    .ok()
                    .filter(|n| n.checked_add(1).is_some())
                    .map(Some),
            }
        };
        let major = component(first)?;
        let minor = major.and(component(first + 1)?);
        let patch = minor.and(component(first + 2)?);
        let pre = patch.and(caps.get(first + 3).map(|m| m.as_str().to_string()));
        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn parse(text: &str) -> Option<Self> {
        let caps = COMPARATOR_RE.captures(text.trim())?;
        if caps.get(0)?.as_str().len() != text.trim().len() || caps.get(1).is_some() {
            return None;
        }
        Self::from_captures(&caps, 2)
    }

    /// Lowest version the partial covers
    fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
        }
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// First version past the partial, `None` when the partial is fully specified
    fn ceiling(&self) -> Option<Version> {
        match (self.major, self.minor, self.patch) {
            (Some(major), None, _) => Some(Version::new(major + 1, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::new(major, minor + 1, 0)),
            _ => None,
        }
    }
}

/// Lowers one `op partial` pair to plain comparators.
/// `None` means the comparator can never match.
fn desugar(op: &str, partial: &Partial) -> Option<Vec<Comparator>> {
    let Some(major) = partial.major else {
        return match op {
            ">" | "<" => None,
            _ => Some(Vec::new()),
        };
    };
    let floor = partial.floor();

    let comparators = match op {
        "" | "=" => match partial.ceiling() {
            Some(ceiling) => vec![
                Comparator::new(Op::Gte, floor),
                Comparator::new(Op::Lt, ceiling),
            ],
            None => vec![Comparator::new(Op::Eq, floor)],
        },
        ">" => match partial.ceiling() {
            Some(ceiling) => vec![Comparator::new(Op::Gte, ceiling)],
            None => vec![Comparator::new(Op::Gt, floor)],
        },
        ">=" => vec![Comparator::new(Op::Gte, floor)],
        "<" => vec![Comparator::new(Op::Lt, floor)],
        "<=" => match partial.ceiling() {
            Some(ceiling) => vec![Comparator::new(Op::Lt, ceiling)],
            None => vec![Comparator::new(Op::Lte, floor)],
        },
        "~" | "~>" => {
            let ceiling = match partial.minor {
                Some(minor) => Version::new(major, minor + 1, 0),
                None => Version::new(major + 1, 0, 0),
            };
            vec![
                Comparator::new(Op::Gte, floor),
                Comparator::new(Op::Lt, ceiling),
            ]
        }
        "^" => {
            let ceiling = match (major, partial.minor, partial.patch) {
                (0, Some(0), Some(patch)) => Version::new(0, 0, patch + 1),
                (0, Some(minor), _) => Version::new(0, minor + 1, 0),
                _ => Version::new(major + 1, 0, 0),
            };
            vec![
                Comparator::new(Op::Gte, floor),
                Comparator::new(Op::Lt, ceiling),
            ]
        }
        _ => return None,
    };
    Some(comparators)
}

/// An npm-style version range: `||`-separated alternatives of
/// space-separated comparators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionReq {
    /// Parse a range, `None` when any part of it is not understood
    pub fn parse(range: &str) -> Option<Self> {
        let mut alternatives = Vec::new();
        for alternative in range.split("||") {
            if let Some(set) = parse_alternative(alternative.trim())? {
                alternatives.push(set);
            }
        }
        Some(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|set| set.iter().all(|comparator| comparator.matches(version)))
    }
}

/// Outer `None` is a parse failure, inner `None` is an alternative that can
/// never match
fn parse_alternative(alternative: &str) -> Option<Option<Vec<Comparator>>> {
    if alternative.is_empty() {
        return Some(Some(Vec::new()));
    }

    let bounds: Vec<&str> = HYPHEN_RE.splitn(alternative, 2).collect();
    if let [low, high] = bounds.as_slice() {
        let low = Partial::parse(low)?;
        let high = Partial::parse(high)?;
        let mut set = Vec::new();
        if low.major.is_some() {
            set.push(Comparator::new(Op::Gte, low.floor()));
        }
        if high.major.is_some() {
            if high.is_full() {
                set.push(Comparator::new(Op::Lte, high.floor()));
            } else {
                set.push(Comparator::new(Op::Lt, high.ceiling()?));
            }
        }
        return Some(Some(set));
    }

    if !COMPARATOR_RE.replace_all(alternative, "").trim().is_empty() {
        return None;
    }

    let mut set = Vec::new();
    for caps in COMPARATOR_RE.captures_iter(alternative) {
        let op = caps.get(1).map_or("", |m| m.as_str());
        let partial = Partial::from_captures(&caps, 2)?;
        match desugar(op, &partial) {
            Some(comparators) => set.extend(comparators),
            None => return Some(None),
        }
    }
    Some(Some(set))
}

/// Shared comparator used by every built-in rule and by override rules:
/// does the version printed in `probe_output` satisfy `constraint`?
pub fn satisfies(probe_output: &str, constraint: &str) -> bool {
    let Some(found) = Version::extract(probe_output) else {
        tracing::debug!("No version found in probe output {:?}", probe_output.trim());
        return false;
    };
    match VersionReq::parse(constraint) {
        Some(req) => req.matches(&found),
        None => {
            tracing::warn!("Unsupported version constraint: {:?}", constraint);
            false
        }
    }
}
