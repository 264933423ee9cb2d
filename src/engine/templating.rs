use std::collections::HashMap;

/// Replaces every `{{key}}` whose key is present in `values` with the mapped
/// string. Tokens with no mapping stay verbatim so missing personalization
/// data is visible instead of silently blanked. Runs over already-rendered
/// text, so tokens inside attribute values behave the same as tokens in
/// content.
pub fn substitute(text: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        if let Some(end_rel) = tail.find("}}") {
            let (token, new_rest) = tail.split_at(end_rel + 2);
            let key = token
                .trim_start_matches("{{")
                .trim_end_matches("}}")
                .trim();
            match values.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(token),
            }
            rest = new_rest;
        } else {
            out.push_str(tail);
            rest = "";
            break;
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_known_token() {
        let out = substitute("Hi {{firstName}}", &values(&[("firstName", "Ada")]));
        assert_eq!(out, "Hi Ada");
    }

    #[test]
    fn unknown_token_stays_verbatim() {
        let out = substitute("Hi {{firstName}}", &HashMap::new());
        assert_eq!(out, "Hi {{firstName}}");
    }

    #[test]
    fn empty_value_blanks_the_token() {
        let out = substitute("Hi {{firstName}}!", &values(&[("firstName", "")]));
        assert_eq!(out, "Hi !");
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        let out = substitute(
            "{{company}} — why {{company}} matters to {{firstName}}",
            &values(&[("company", "Acme"), ("firstName", "Sam")]),
        );
        assert_eq!(out, "Acme — why Acme matters to Sam");
    }

    #[test]
    fn tokens_inside_attributes_behave_like_content() {
        let out = substitute(
            r#"<a href="https://x.com/?ref={{email}}">{{firstName}}</a>"#,
            &values(&[("email", "ada@example.com"), ("firstName", "Ada")]),
        );
        assert_eq!(out, r#"<a href="https://x.com/?ref=ada@example.com">Ada</a>"#);
    }

    #[test]
    fn unterminated_token_is_left_alone() {
        let out = substitute("Hello {{firstName", &values(&[("firstName", "Ada")]));
        assert_eq!(out, "Hello {{firstName");
    }

    #[test]
    fn whitespace_inside_braces_is_tolerated() {
        let out = substitute("Hi {{ firstName }}", &values(&[("firstName", "Ada")]));
        assert_eq!(out, "Hi Ada");
    }
}
