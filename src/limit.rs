//! Limit expression parsing and the [`Limit`] value object.
//!
//! A `Limit` is the compact textual syntax (`10/minute`, `5 per 3 seconds`)
//! parsed into its canonical `(amount, multiples, granularity)` form, which
//! in turn derives the storage key every strategy keys its buckets under.

use std::fmt;

use crate::error::Error;

/// A control character (ASCII unit separator) used to join a limit's
/// canonical string with its identity components.
///
/// The canonical form (§4.A) only ever contains ASCII digits, `/`, and
/// lowercase granularity names, so this byte can never appear in it and
/// the join is unambiguous and injective.
const SEP: char = '\u{1f}';

/// The base time unit of a [`Limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Second,
    Minute,
    Hour,
    Day,
    /// A fixed 30-day approximation; calendar months are not modeled.
    Month,
    /// A fixed 365-day approximation; leap years are not modeled.
    Year,
}

impl Granularity {
    /// The number of seconds in one unit of this granularity.
    pub const fn seconds(self) -> u64 {
        match self {
            Granularity::Second => 1,
            Granularity::Minute => 60,
            Granularity::Hour => 3_600,
            Granularity::Day => 86_400,
            Granularity::Month => 30 * 86_400,
            Granularity::Year => 365 * 86_400,
        }
    }

    /// The canonical singular name used in a [`Limit`]'s canonical string.
    pub const fn name(self) -> &'static str {
        match self {
            Granularity::Second => "second",
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    fn parse(token: &str) -> Result<Self, Error> {
        let lower = token.to_ascii_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "second" => Ok(Granularity::Second),
            "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(Error::Parse(format!("unknown granularity: {token:?}"))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable rate limit: `amount` events per `multiples × granularity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limit {
    amount: u64,
    multiples: u64,
    granularity: Granularity,
}

impl Limit {
    /// Builds a limit directly, bypassing the textual parser.
    ///
    /// # Panics
    ///
    /// Panics if `amount` or `multiples` is zero; both must be positive
    /// integers per the data model.
    pub fn new(amount: u64, multiples: u64, granularity: Granularity) -> Self {
        assert!(amount > 0, "limit amount must be positive");
        assert!(multiples > 0, "limit multiples must be positive");
        Self {
            amount,
            multiples,
            granularity,
        }
    }

    /// The number of events permitted per window.
    #[inline]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// The granularity multiplier.
    #[inline]
    pub fn multiples(&self) -> u64 {
        self.multiples
    }

    /// The base time unit.
    #[inline]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// The full window length, in seconds.
    #[inline]
    pub fn window_seconds(&self) -> u64 {
        self.multiples * self.granularity.seconds()
    }

    /// The canonical textual form, e.g. `"10/3/minute"`.
    pub fn canonical(&self) -> String {
        format!("{}/{}/{}", self.amount, self.multiples, self.granularity)
    }

    /// The base storage key for this limit and an identity, before any
    /// strategy-specific suffix (such as a fixed window's bucket epoch) is
    /// appended.
    ///
    /// The fingerprint embeds `amount`, `multiples`, and `granularity` (via
    /// [`Limit::canonical`]), so two limits that differ in shape occupy
    /// disjoint key spaces even for the same identity.
    pub fn storage_key(&self, identity: &[&str]) -> String {
        let mut key = self.canonical();
        for component in identity {
            key.push(SEP);
            key.push_str(component);
        }
        key
    }
}

/// Parses a single textual limit expression.
///
/// ```text
/// limit      := amount ( "/" | " per " ) [ multiples ] granularity
/// amount     := positive integer
/// multiples  := positive integer   (default 1 if absent)
/// granularity := "second"|"minute"|"hour"|"day"|"month"|"year" (also plural)
/// ```
///
/// Parsing is case-insensitive and whitespace-tolerant: `10/minute`,
/// `10 per minute`, `10 per 1 minute`, and `10/1 minute` all parse to the
/// same [`Limit`].
pub fn parse(text: &str) -> Result<Limit, Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Parse("empty limit expression".to_string()));
    }

    let (amount_part, rest) = split_on_separator(trimmed)?;

    let amount: u64 = amount_part
        .trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid amount: {amount_part:?}")))?;
    if amount == 0 {
        return Err(Error::Parse("limit amount must be positive".to_string()));
    }

    // The remainder after the amount may still use either separator form
    // (`3/minute` from a canonical string, `3 minutes` from prose), so split
    // on both.
    let tokens: Vec<&str> = rest
        .trim()
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    let (multiples, granularity_token) = match tokens.as_slice() {
        [granularity] => (1, *granularity),
        [multiples, granularity] => {
            let multiples: u64 = multiples
                .parse()
                .map_err(|_| Error::Parse(format!("invalid multiples: {multiples:?}")))?;
            if multiples == 0 {
                return Err(Error::Parse("limit multiples must be positive".to_string()));
            }
            (multiples, *granularity)
        }
        _ => {
            return Err(Error::Parse(format!(
                "malformed limit expression: {text:?}"
            )));
        }
    };

    let granularity = Granularity::parse(granularity_token)?;
    Ok(Limit::new(amount, multiples, granularity))
}

/// Parses a `;`-separated sequence of limit expressions, e.g.
/// `"10/second;1000/day"`.
pub fn parse_many(text: &str) -> Result<Vec<Limit>, Error> {
    text.split(';').map(parse).collect()
}

fn split_on_separator(text: &str) -> Result<(&str, &str), Error> {
    if let Some(idx) = text.find('/') {
        return Ok((&text[..idx], &text[idx + 1..]));
    }

    let lower = text.to_ascii_lowercase();
    if let Some(idx) = lower.find(" per ") {
        return Ok((&text[..idx], &text[idx + 5..]));
    }

    Err(Error::Parse(format!(
        "malformed limit expression (expected '/' or ' per '): {text:?}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_form() {
        let limit = parse("10/minute").unwrap();
        assert_eq!(limit.amount(), 10);
        assert_eq!(limit.multiples(), 1);
        assert_eq!(limit.granularity(), Granularity::Minute);
    }

    #[test]
    fn equivalent_forms_parse_identically() {
        let forms = ["10/minute", "10 per minute", "10 per 1 minute", "10/1 minute"];
        let parsed: Vec<Limit> = forms.iter().map(|s| parse(s).unwrap()).collect();
        for window in parsed.windows(2) {
            assert_eq!(window[0], window[1]);
        }
    }

    #[test]
    fn is_case_insensitive_and_whitespace_tolerant() {
        let limit = parse("  5 PER 3 SECONDS  ").unwrap();
        assert_eq!(limit.amount(), 5);
        assert_eq!(limit.multiples(), 3);
        assert_eq!(limit.granularity(), Granularity::Second);
    }

    #[test]
    fn accepts_plural_and_singular_granularities() {
        assert_eq!(parse("1/seconds").unwrap().granularity(), Granularity::Second);
        assert_eq!(parse("1/second").unwrap().granularity(), Granularity::Second);
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(parse("minute").is_err());
        assert!(parse("10").is_err());
        assert!(parse("0/minute").is_err());
        assert!(parse("10/0 minute").is_err());
        assert!(parse("10/fortnight").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn parse_many_splits_on_semicolon() {
        let limits = parse_many("10/second;1000/day").unwrap();
        assert_eq!(limits.len(), 2);
        assert_eq!(limits[0], parse("10/second").unwrap());
        assert_eq!(limits[1], parse("1000/day").unwrap());
    }

    #[test]
    fn canonical_round_trips() {
        for s in ["10/1/minute", "5/3/second", "1/1/year"] {
            let limit = parse(s).unwrap();
            assert_eq!(limit.canonical(), s);
        }
    }

    #[test]
    fn limit_shape_changes_disjoint_storage_key() {
        let a = Limit::new(10, 1, Granularity::Minute);
        let b = Limit::new(11, 1, Granularity::Minute);
        let c = Limit::new(10, 2, Granularity::Minute);
        let d = Limit::new(10, 1, Granularity::Hour);
        let identity = ["user-1"];
        let keys = [
            a.storage_key(&identity),
            b.storage_key(&identity),
            c.storage_key(&identity),
            d.storage_key(&identity),
        ];
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i], keys[j]);
            }
        }
    }

    #[test]
    fn identity_components_are_isolated() {
        let limit = Limit::new(10, 1, Granularity::Minute);
        assert_ne!(
            limit.storage_key(&["user-1"]),
            limit.storage_key(&["user-2"])
        );
        assert_ne!(
            limit.storage_key(&["tenant-1", "user-1"]),
            limit.storage_key(&["tenant-1", "user-2"])
        );
    }

    #[test]
    fn window_seconds_accounts_for_multiples() {
        let limit = Limit::new(5, 3, Granularity::Second);
        assert_eq!(limit.window_seconds(), 3);
        let limit = Limit::new(5, 2, Granularity::Hour);
        assert_eq!(limit.window_seconds(), 7_200);
    }
}
