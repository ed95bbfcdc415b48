/// Generational suffixes the two sources disagree on
///
/// " III" is listed before " II" so the longer suffix wins.
const GENERATIONAL_SUFFIXES: [&str; 3] = [" jr.", " iii", " ii"];

/// Case-folded, trimmed form used for exact comparisons
pub fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-folded name with one trailing generational suffix removed
///
/// "Marvin Harrison Jr." and "marvin harrison" both map to "marvin harrison".
pub fn suffix_key(name: &str) -> String {
    let folded = fold(name);
    for suffix in GENERATIONAL_SUFFIXES {
        if let Some(stripped) = folded.strip_suffix(suffix) {
            return stripped.trim_end().to_string();
        }
    }
    folded
}
