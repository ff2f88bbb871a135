use itertools::Itertools;

/// Trims line ids and drops empty and repeated ones, keeping the first occurrence.
pub fn normalize_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .filter(|line| !line.is_empty())
        .unique()
        .collect_vec()
}
