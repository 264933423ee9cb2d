use serde_json::Value;

use crate::models::component::StyleMap;

/// Numeric values for these keys are emitted bare; everything else numeric
/// gets a `px` suffix.
const UNITLESS_KEYS: [&str; 4] = ["fontWeight", "lineHeight", "opacity", "zIndex"];

/// Flattens a style map into `property: value; ` declarations ready for an
/// inline `style` attribute. Keys are walked in insertion order; the
/// `paddingX`/`paddingY` shorthands expand in place into their physical
/// padding properties and never appear literally. Malformed values are
/// skipped, never an error.
pub fn normalize(styles: &StyleMap) -> String {
    let mut css = String::new();
    for (key, value) in styles.iter() {
        match key.as_str() {
            "paddingX" => {
                if let Value::Number(n) = value {
                    push_decl(&mut css, "padding-left", &format!("{}px", n));
                    push_decl(&mut css, "padding-right", &format!("{}px", n));
                }
            }
            "paddingY" => {
                if let Value::Number(n) = value {
                    push_decl(&mut css, "padding-top", &format!("{}px", n));
                    push_decl(&mut css, "padding-bottom", &format!("{}px", n));
                }
            }
            _ => match value {
                Value::String(s) => push_decl(&mut css, &to_kebab_case(key), s),
                Value::Number(n) => {
                    let rendered = if UNITLESS_KEYS.contains(&key.as_str()) {
                        n.to_string()
                    } else {
                        format!("{}px", n)
                    };
                    push_decl(&mut css, &to_kebab_case(key), &rendered);
                }
                _ => {}
            },
        }
    }
    css
}

fn push_decl(css: &mut String, property: &str, value: &str) {
    css.push_str(property);
    css.push_str(": ");
    css.push_str(value);
    css.push_str("; ");
}

fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn styles(raw: serde_json::Value) -> StyleMap {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn empty_map_normalizes_to_empty_string() {
        assert_eq!(normalize(&StyleMap::default()), "");
    }

    #[test]
    fn padding_x_expands_to_physical_properties() {
        let css = normalize(&styles(json!({ "paddingX": 10 })));
        assert!(css.contains("padding-left: 10px; "));
        assert!(css.contains("padding-right: 10px; "));
        assert!(!css.contains("paddingX"));
    }

    #[test]
    fn padding_y_expands_to_physical_properties() {
        let css = normalize(&styles(json!({ "paddingY": 8 })));
        assert_eq!(css, "padding-top: 8px; padding-bottom: 8px; ");
    }

    #[test]
    fn unitless_keys_stay_bare() {
        assert_eq!(
            normalize(&styles(json!({ "fontWeight": 700 }))),
            "font-weight: 700; "
        );
        assert_eq!(
            normalize(&styles(json!({ "lineHeight": 1.5, "opacity": 0.8, "zIndex": 3 }))),
            "line-height: 1.5; opacity: 0.8; z-index: 3; "
        );
    }

    #[test]
    fn numeric_values_get_px() {
        assert_eq!(
            normalize(&styles(json!({ "fontSize": 16 }))),
            "font-size: 16px; "
        );
    }

    #[test]
    fn string_values_pass_through_verbatim() {
        assert_eq!(
            normalize(&styles(json!({ "backgroundColor": "#3B82F6", "width": "100%" }))),
            "background-color: #3B82F6; width: 100%; "
        );
    }

    #[test]
    fn insertion_order_is_preserved_with_inline_expansion() {
        let css = normalize(&styles(json!({ "backgroundColor": "#3B82F6", "paddingX": 20 })));
        assert_eq!(
            css,
            "background-color: #3B82F6; padding-left: 20px; padding-right: 20px; "
        );
    }

    #[test]
    fn malformed_values_are_skipped() {
        let css = normalize(&styles(json!({
            "paddingX": "not-a-number",
            "border": null,
            "margin": [1, 2],
            "color": "#111"
        })));
        assert_eq!(css, "color: #111; ");
    }

    #[test]
    fn normalize_is_repeatable() {
        let map = styles(json!({ "paddingY": 12, "fontWeight": 600, "color": "#222" }));
        assert_eq!(normalize(&map), normalize(&map));
    }
}
