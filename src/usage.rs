/// Keys referenced as `<alias>.<key>` anywhere in `text`, in declaration order.
pub fn used_keys<'k>(alias: &str, keys: &'k [String], text: &str) -> Vec<&'k str> {
    keys.iter()
        .filter(|key| {
            let needle = format!("{alias}.{key}");
            text.contains(&needle)
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_alias_qualified_keys() {
        let k = keys(&["header", "footer", "body"]);
        let text = "<View style={S.header}><Text style={[S.body, other.footer]} /></View>";
        assert_eq!(used_keys("S", &k, text), vec!["header", "body"]);
    }

    #[test]
    fn prefix_of_longer_identifier_counts_as_usage() {
        let k = keys(&["head"]);
        assert_eq!(used_keys("S", &k, "S.header"), vec!["head"]);
    }

    #[test]
    fn other_alias_does_not_count() {
        let k = keys(&["foo"]);
        assert!(used_keys("S2", &k, "S1.foo").is_empty());
    }
}
