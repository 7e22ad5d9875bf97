//! Helpers for ordered lists of extension and layer names.

pub fn contains<S: AsRef<str>>(names: &[S], name: &str) -> bool {
    names.iter().any(|element| element.as_ref() == name)
}

/// Pushes every name of `candidates` onto `list` unless `list` already holds it.
///
/// `list` is checked incrementally, so duplicates inside `candidates` collapse
/// to their first occurrence.
pub fn append_if_absent<I, S>(list: &mut Vec<String>, candidates: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for name in candidates {
        let name = name.as_ref();
        if !contains(list, name) {
            list.push(name.to_owned());
        }
    }
}
