// Text normalization shared by the lexical search paths


/// Stop words dropped from queries before lexical matching, in normalized form
pub const STOP_WORDS: &[&str] = &[
    "i", "u", "na", "je", "da", "se", "su", "za", "od", "koji", "koja", "koje", "sto", "kao",
    "ali", "ili", "te", "pa", "jer", "biti", "sam", "smo",
];

/// Replace accented Latin letters with their unaccented base letter.
///
/// Case and punctuation are preserved. `đ` has no canonical decomposition, so the
/// folding is table driven rather than based on Unicode normalization.
#[inline]
pub fn fold_diacritics(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'č' | 'ć' | 'ç' => 'c',
        'Č' | 'Ć' | 'Ç' => 'C',
        'đ' => 'd',
        'Đ' => 'D',
        'š' => 's',
        'Š' => 'S',
        'ž' => 'z',
        'Ž' => 'Z',
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

/// Lowercase, fold diacritics, turn punctuation into spaces and collapse whitespace
#[inline]
pub fn normalize(text: &str) -> String {
    let folded: String = fold_diacritics(&text.to_lowercase())
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Normalized tokens of `text` with stop words removed
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| !token.is_empty() && !is_stop_word(token))
        .map(str::to_string)
        .collect()
}
