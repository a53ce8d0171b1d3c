/// Join display names for a multi-account card.
///
/// `["A"]` is `"A"`, `["A", "B"]` is `"A & B"`, `["A", "B", "C"]` is
/// `"A, B & C"`. Names are joined by position, so duplicates are kept.
pub fn combine_names<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(AsRef::as_ref).collect();
            format!("{} & {}", head.join(", "), last.as_ref())
        }
    }
}
