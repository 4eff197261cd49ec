use regex::Regex;

/// Case-insensitive literal match for `marker`.
fn marker_pattern(marker: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i){}", regex::escape(marker)))
}

/// Find the pairing token announced in a tenant's recent log lines.
///
/// Scans from the newest line backwards for one containing `marker`
/// (case-insensitive) and returns the last whitespace-separated word after
/// the marker, stripped of surrounding punctuation. A marker line with
/// nothing after it does not count.
pub fn extract_pairing_token<S: AsRef<str>>(lines: &[S], marker: &str) -> Option<String> {
    let pattern = marker_pattern(marker).ok()?;
    lines.iter().rev().find_map(|line| {
        let line = line.as_ref();
        let found = pattern.find_iter(line).last()?;
        line[found.end()..]
            .split_whitespace()
            .last()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
            })
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}
