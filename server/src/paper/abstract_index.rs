//! OpenAlex ships abstracts as an inverted index, `{ word: [positions] }`.

use std::collections::BTreeMap;

use serde_json::Value;

pub const ABSTRACT_NOT_AVAILABLE: &str = "Abstract Not Available";

/// Put every word back at each of its positions and join with spaces.
///
/// Positions that no word claims are skipped, as are empty words and
/// positions that are not non-negative integers. When two words claim the
/// same position the one listed later wins. A missing, malformed or empty
/// index yields [`ABSTRACT_NOT_AVAILABLE`].
pub fn restore_abstract(index: Option<&Value>) -> String {
    let Some(index) = index.and_then(Value::as_object) else {
        return ABSTRACT_NOT_AVAILABLE.to_string();
    };

    let mut words: BTreeMap<u64, &str> = BTreeMap::new();
    for (word, positions) in index {
        let Some(positions) = positions.as_array() else {
            continue;
        };
        for pos in positions.iter().filter_map(as_position) {
            words.insert(pos, word.as_str());
        }
    }

    let text = words
        .into_values()
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        ABSTRACT_NOT_AVAILABLE.to_string()
    } else {
        text
    }
}

fn as_position(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}
