//! `LIKE`/array-contains argument escaping.

/// Double every backslash in `arg`, leaving every other character untouched.
///
/// In SQL-92, backslash is the `LIKE` escape character, so a literal
/// backslash in a user-supplied pattern must be doubled to survive the
/// driver round-trip. `%` and `_` are deliberately left alone: this
/// operator lets callers use SQL wildcards in their filter values, it does
/// not turn the operator into a literal-substring search.
pub fn escape_like_arg(arg: &str) -> String {
    arg.replace('\\', "\\\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_backslashes_only() {
        assert_eq!(escape_like_arg("A\\B"), "A\\\\B");
    }

    #[test]
    fn leaves_wildcards_alone() {
        assert_eq!(escape_like_arg("50%_off"), "50%_off");
    }

    #[test]
    fn empty_string_is_unchanged() {
        assert_eq!(escape_like_arg(""), "");
    }
}
