/// Levenshtein distance over Unicode scalar values; insertion, deletion and
/// substitution each cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

/// Single-column DP; the column spans the shorter input.
pub(crate) fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut column: Vec<usize> = (0..=short.len()).collect();

    for (x, long_char) in long.iter().enumerate() {
        let mut diagonal = column[0];
        column[0] = x + 1;
        for (y, short_char) in short.iter().enumerate() {
            let above = column[y + 1];
            let cost = usize::from(short_char != long_char);
            column[y + 1] = (above + 1).min(column[y] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }
    column[short.len()]
}
