// Recipes built on the public contract.
use dual_hashmap::recipes::{find_duplicates, two_sum, word_frequency};
use dual_hashmap::{ChainedHashMap, OpenHashMap};

// Test: pair-sum over [2, 7, 11, 15] with target 9 finds indices 0 and 1.
#[test]
fn two_sum_example() {
    assert_eq!(two_sum(&[2, 7, 11, 15], 9), Some((0, 1)));
    assert_eq!(two_sum(&[2, 7, 11, 15], 26), Some((2, 3)));
    assert_eq!(two_sum(&[-3, 4, 3, 90], 0), Some((0, 2)));
    assert_eq!(two_sum(&[5], 10), None);
}

// Test: duplicates in a mixed sequence are reported once each.
#[test]
fn find_duplicates_example() {
    let mut dups = find_duplicates(vec![1, 2, 3, 4, 2, 5, 6, 3, 7, 1]);
    dups.sort_unstable();
    assert_eq!(dups, vec![1, 2, 3]);

    let words = find_duplicates("to be or not to be".split(' ').map(String::from));
    let mut words: Vec<String> = words;
    words.sort();
    assert_eq!(words, vec!["be".to_string(), "to".to_string()]);
}

// Test: word counts from the sample sentence, identical for both
// strategies.
#[test]
fn word_frequency_example() {
    let text = "the quick brown fox jumps over the lazy dog the fox is quick";
    let mut chained = word_frequency::<ChainedHashMap<String, usize>>(text).unwrap();
    let mut open = word_frequency::<OpenHashMap<String, usize>>(text).unwrap();
    chained.sort();
    open.sort();
    assert_eq!(chained, open);

    let the = chained.iter().find(|(w, _)| w == "the").map(|&(_, n)| n);
    assert_eq!(the, Some(3));
    let total: usize = chained.iter().map(|(_, n)| n).sum();
    assert_eq!(total, text.split_whitespace().count());
}
