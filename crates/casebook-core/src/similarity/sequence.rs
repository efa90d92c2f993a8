//! Character-level sequence similarity for free-text fields.

/// Similarity ratio of two character sequences, in [0, 1].
///
/// Counts the characters covered by the matching blocks of the two
/// sequences (the longest common block, then recursively the longest
/// blocks to its left and right), doubles the count, and divides by the
/// combined length. Two empty strings are identical.
pub fn matching_blocks_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let combined = a.len() + b.len();
    if combined == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / combined as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_chars(&a[..start_a], &b[..start_b])
        + matched_chars(&a[start_a + len..], &b[start_b + len..])
}

/// Longest common contiguous block as (start in a, start in b, length).
/// Ties go to the earliest block.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // suffix_len[j + 1] = length of the common block ending at a[i], b[j]
    let mut suffix_len = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        // walk j backwards so suffix_len[j] still holds the previous row
        for j in (0..b.len()).rev() {
            suffix_len[j + 1] = if b[j] == *ca { suffix_len[j] + 1 } else { 0 };
        }
        for (j_end, &len) in suffix_len.iter().enumerate().skip(1) {
            if len > best.2 {
                best = (i + 1 - len, j_end - len, len);
            }
        }
    }
    best
}
