/// One step of the raw edit script, in original-text order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOp<'a> {
    Keep(&'a str),
    Insert(&'a str),
    Delete(&'a str),
}

/// Split text into whitespace-delimited tokens
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Align two token sequences with a longest-common-subsequence table.
///
/// On a mismatch the backtrack prefers an insertion whenever
/// `dp[i][j-1] >= dp[i-1][j]`, so on ties insertions end up to the right of
/// deletions once the script is read left to right.
pub fn align<'a>(original: &[&'a str], corrected: &[&'a str]) -> Vec<RawOp<'a>> {
    let m = original.len();
    let n = corrected.len();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if original[i - 1] == corrected[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(m + n);
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && original[i - 1] == corrected[j - 1] {
            ops.push(RawOp::Keep(original[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            ops.push(RawOp::Insert(corrected[j - 1]));
            j -= 1;
        } else {
            ops.push(RawOp::Delete(original[i - 1]));
            i -= 1;
        }
    }

    ops.reverse();
    ops
}
