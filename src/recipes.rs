//! Small programs built only on the public map and set contract.

use crate::chained_hash_map::ChainedHashMap;
use crate::chained_set::ChainedSet;
use crate::error::{MapError, Result};
use crate::slot_hash::SlotHash;
use crate::KeyValueMap;

const WORD_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '(', ')', '[', ']'];

/// Elements that occur more than once, each reported once, in the order of
/// the duplicate set.
pub fn find_duplicates<T, I>(items: I) -> Vec<T>
where
    T: SlotHash + Eq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = ChainedSet::new();
    let mut duplicates = ChainedSet::new();
    for item in items {
        if seen.contains(&item) {
            duplicates.add(item);
        } else {
            seen.add(item);
        }
    }
    duplicates.to_vec()
}

/// Indices `(i, j)`, `i < j`, of the first pair summing to `target`, found
/// in one pass by remembering the index of every value seen so far.
pub fn two_sum(nums: &[i64], target: i64) -> Option<(usize, usize)> {
    let mut seen: ChainedHashMap<i64, usize> = ChainedHashMap::new();
    for (i, &num) in nums.iter().enumerate() {
        if let Some(complement) = target.checked_sub(num) {
            if let Ok(&j) = seen.get(&complement) {
                return Some((j, i));
            }
        }
        seen.put(num, i);
    }
    None
}

/// Case-insensitive word counts. Words are split on whitespace and stripped
/// of surrounding punctuation; a missing key marks a first occurrence.
/// Results come back in the counter's iteration order.
pub fn word_frequency<M>(text: &str) -> Result<Vec<(String, usize)>>
where
    M: KeyValueMap<String, usize> + Default,
{
    let mut counter = M::default();
    let lowered = text.to_lowercase();
    for word in lowered.split_whitespace() {
        let word = word.trim_matches(WORD_PUNCTUATION);
        if word.is_empty() {
            continue;
        }
        let next = match counter.get(word) {
            Ok(n) => n + 1,
            Err(MapError::KeyNotFound) => 1,
            Err(e) => return Err(e),
        };
        counter.put(word.to_string(), next)?;
    }
    Ok(counter
        .items()
        .map(|(w, n)| (w.clone(), *n))
        .collect())
}
