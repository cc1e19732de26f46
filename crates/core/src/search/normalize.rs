//! Text normalization shared by indexing and querying.

/// Lowercase, fold Croatian diacritics, turn punctuation into spaces and
/// collapse whitespace.
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = fold(ch);
        if folded.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(folded);
        } else {
            pending_space = true;
        }
    }

    out
}

fn fold(ch: char) -> char {
    match ch {
        'č' | 'ć' => 'c',
        'đ' => 'd',
        'š' => 's',
        'ž' => 'z',
        other => other,
    }
}
