const VERSION_OPERATORS: [&str; 3] = [">=", "=", "<"];

/// Strips a version operator suffix from a raw dependency token.
///
/// Operators are cut in a fixed order (`>=`, `=`, `<`), each applied to the
/// output of the previous one, so the result is the text before the earliest
/// of them and applying it twice changes nothing.
pub fn normalize_dependency(token: &str) -> &str {
    VERSION_OPERATORS.iter().fold(token, |current, op| {
        current
            .split_once(op)
            .map(|(name, _)| name)
            .unwrap_or(current)
    })
}

pub fn split_depends(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|token| normalize_dependency(token).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::core::depend::{normalize_dependency, split_depends};

    #[test]
    fn strips_operators_by_precedence() {
        assert_eq!(normalize_dependency("libfoo>=1.2"), "libfoo");
        assert_eq!(normalize_dependency("libfoo=1.2-r0"), "libfoo");
        assert_eq!(normalize_dependency("libfoo<2"), "libfoo");
        assert_eq!(normalize_dependency("libfoo"), "libfoo");
        assert_eq!(normalize_dependency("libfoo>1"), "libfoo>1");
        assert_eq!(normalize_dependency("a<1=2"), "a");
    }

    #[test]
    fn normalization_is_idempotent() {
        for token in [
            "libfoo>=1.2",
            "a<1=2",
            "b=>3",
            "c<=4",
            ">=5",
            "so:libc.musl-x86_64.so.1",
            "d>=1<2",
            "",
        ] {
            let once = normalize_dependency(token);
            assert_eq!(normalize_dependency(once), once, "token {token:?}");
        }
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(
            split_depends("  musl>=1.2\tbusybox  \n zlib "),
            vec!["musl", "busybox", "zlib"]
        );
        assert!(split_depends("").is_empty());
    }
}
