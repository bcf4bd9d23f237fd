use log::warn;

// @module: Range expression selection ("5", "8-10")

/// Expand a list of range expressions into the positions they select.
///
/// Each expression is either a single 1-based position (`"5"`) or an inclusive
/// pair (`"8-10"`). Positions above `max` are dropped, and a reversed pair such
/// as `"10-8"` selects nothing. Malformed numbers parse to `0`, which never
/// matches a 1-based position. The result may contain duplicates.
pub fn select<S: AsRef<str>>(expressions: &[S], max: i64) -> Vec<i64> {
    let mut positions = Vec::new();

    for expression in expressions {
        let expression = expression.as_ref();
        let parts: Vec<&str> = expression.split('-').collect();

        if parts.len() > 1 {
            let lo = parse_position(parts[0], expression);
            let hi = parse_position(parts[1], expression);
            positions.extend(lo..=hi.min(max));
        } else {
            let position = parse_position(expression, expression);
            if position <= max {
                positions.push(position);
            }
        }
    }

    positions
}

// @returns: Parsed integer, or 0 when the token is not a number
fn parse_position(token: &str, expression: &str) -> i64 {
    match token.trim().parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring malformed range expression '{}'", expression);
            0
        }
    }
}

/// A section or episode filter built from user range expressions.
///
/// `None` means the filter is disabled and every position passes. An explicit
/// empty list selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFilter {
    expressions: Option<Vec<String>>,
}

impl RangeFilter {
    /// Filter that lets every position through
    pub fn all() -> Self {
        Self { expressions: None }
    }

    /// Filter restricted to the union of the given expressions
    pub fn new<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expressions: Some(expressions.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.expressions.is_some()
    }

    /// Resolve the filter against an upper bound.
    ///
    /// Returns `None` when the filter is disabled.
    pub fn resolve(&self, max: i64) -> Option<Selection> {
        self.expressions
            .as_ref()
            .map(|expressions| Selection { positions: select(expressions, max) })
    }
}

impl From<Option<Vec<String>>> for RangeFilter {
    fn from(expressions: Option<Vec<String>>) -> Self {
        Self { expressions }
    }
}

/// Positions selected by a resolved [`RangeFilter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    positions: Vec<i64>,
}

impl Selection {
    pub fn contains(&self, position: i64) -> bool {
        position >= 1 && self.positions.contains(&position)
    }

    pub fn positions(&self) -> &[i64] {
        &self.positions
    }
}

/// Membership check against an optionally resolved selection
pub fn is_selected(selection: Option<&Selection>, position: i64) -> bool {
    selection.is_none_or(|s| s.contains(position))
}
