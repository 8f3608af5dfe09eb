//! Date extraction from time-partitioned index names.
//!
//! Daily indices carry their partition date as a trailing numeric suffix,
//! e.g. `logstash-2024.02.10`. [`index_age`] pulls that suffix out and
//! parses it as a calendar date. Names without a recognisable suffix have
//! no age and are handled separately by the catalog.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Non-greedy prefix followed by 2-4 numeric groups of 2-4 digits each,
/// optionally separated by dots.
///
/// The prefix is lazy, so the suffix takes as many trailing groups as it
/// can. A version number that directly precedes the date becomes part of
/// the suffix (`metrics-v10.2023.01.01` captures `10.2023.01.01`), and such
/// a name has no age. Separate the version with a non-digit, non-dot
/// character (`metrics-v10-2023.01.01`) to keep the name dated.
pub const DATED_INDEX_PATTERN: &str = r"^(.+?)((?:\d{2,4}\.*?){2,4})$";

/// The only suffix layout that yields an age: `YYYY.MM.DD`.
pub const INDEX_DATE_LAYOUT: &str = "%Y.%m.%d";

/// Compiled once, shared read-only.
static DATED_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATED_INDEX_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Return the numeric date suffix matched in `name`, if the name has one.
///
/// The suffix is not guaranteed to be a valid date; see [`index_age`].
pub fn date_suffix(name: &str) -> Option<&str> {
    DATED_INDEX_RE
        .captures(name)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Extract the partition date embedded in an index name.
///
/// Returns `None` when the name has no numeric suffix or when the suffix
/// is not exactly `YYYY.MM.DD` with a real calendar date. Formatting the
/// returned date with [`INDEX_DATE_LAYOUT`] always reproduces the suffix.
pub fn index_age(name: &str) -> Option<NaiveDate> {
    let suffix = date_suffix(name)?;
    let date = NaiveDate::parse_from_str(suffix, INDEX_DATE_LAYOUT).ok()?;

    // chrono tolerates short or unpadded fields; the layout is strict.
    if date.format(INDEX_DATE_LAYOUT).to_string() != suffix {
        return None;
    }

    Some(date)
}
