use std::env;

/// Expands `${VAR}` and `${VAR:-default}` references in `input` against the
/// process environment. Unknown `${VAR}` with no default expands to an empty
/// string rather than failing — matches the teacher's permissive env-driven
/// config loading in `cli::config::load_config`.
pub fn substitute(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(close) => {
                out.push_str(&resolve(&after[..close]));
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve(inner: &str) -> String {
    match inner.split_once(":-") {
        Some((name, default)) => env::var(name).unwrap_or_else(|_| default.to_string()),
        None => env::var(inner).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_present_var() {
        env::set_var("GW_TEST_VAR_A", "hello");
        assert_eq!(substitute("value: ${GW_TEST_VAR_A}"), "value: hello");
    }

    #[test]
    fn falls_back_to_default_when_unset() {
        env::remove_var("GW_TEST_VAR_B");
        assert_eq!(substitute("value: ${GW_TEST_VAR_B:-fallback}"), "value: fallback");
    }

    #[test]
    fn default_ignored_when_var_present() {
        env::set_var("GW_TEST_VAR_C", "set");
        assert_eq!(substitute("${GW_TEST_VAR_C:-fallback}"), "set");
    }

    #[test]
    fn unset_with_no_default_is_empty() {
        env::remove_var("GW_TEST_VAR_D");
        assert_eq!(substitute("x${GW_TEST_VAR_D}y"), "xy");
    }

    #[test]
    fn passthrough_text_without_placeholders() {
        assert_eq!(substitute("plain text, no vars"), "plain text, no vars");
    }
}
