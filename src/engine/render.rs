use crate::engine::style::normalize;
use crate::models::component::{Column, EmailComponent, ImagePosition};
use crate::models::template::Template;

/// Renders a template to a complete, standalone HTML5 document: doctype, a
/// `<style>` block carrying the page-level background, and the component
/// tree as inline-styled markup. Pure: two calls on the same template
/// produce byte-identical output.
pub fn render_document(template: &Template) -> String {
    let content = template
        .components
        .iter()
        .map(|component| render_node(component, 1))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let page = &template.page_style;
    let mut wrapper = String::new();
    wrapper.push_str(&format!(
        "    background-color: {};\n",
        page.background_color
    ));
    if let Some(url) = &page.background_image {
        wrapper.push_str(&format!("    background-image: url('{}');\n", url));
    }
    wrapper.push_str(&format!("    background-size: {};\n", page.background_size));
    wrapper.push_str(&format!(
        "    background-repeat: {};\n",
        page.background_repeat
    ));
    wrapper.push_str(&format!(
        "    background-position: {};\n",
        page.background_position
    ));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>
  body {{ margin: 0; padding: 0; font-family: Arial, Helvetica, sans-serif; }}
  img {{ max-width: 100%; }}
  .wrapper {{
{wrapper}  }}
</style>
</head>
<body>
<div class="wrapper">
{content}
</div>
</body>
</html>
"#
    )
}

/// Emits the HTML fragment for one node. Unrecognized nodes emit nothing so
/// a single drifted component cannot take down the whole document.
/// `indent` is cosmetic nesting depth.
pub fn render_node(component: &EmailComponent, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match component {
        EmailComponent::Text { styles, content, .. }
        | EmailComponent::Container { styles, content, .. } => {
            format!("{pad}<div style=\"{}\">{}</div>", normalize(styles), content)
        }
        EmailComponent::Button {
            styles,
            content,
            url,
            ..
        } => {
            let align = styles.get_str("textAlign").unwrap_or("center");
            let href = if url.is_empty() { "#" } else { url.as_str() };
            format!(
                "{pad}<div style=\"text-align: {align}; width: 100%;\"><a href=\"{href}\" style=\"{}\">{}</a></div>",
                normalize(styles),
                content
            )
        }
        EmailComponent::Image {
            styles, src, alt, ..
        } => {
            let align = styles.get_str("textAlign").unwrap_or("center");
            format!(
                "{pad}<div style=\"text-align: {align};\"><img src=\"{src}\" alt=\"{alt}\" style=\"{}\"></div>",
                normalize(styles)
            )
        }
        EmailComponent::Divider { styles, .. } => {
            format!("{pad}<hr style=\"{}\">", normalize(styles))
        }
        EmailComponent::Spacer { styles, .. } => {
            format!("{pad}<div style=\"{}\"></div>", normalize(styles))
        }
        EmailComponent::Columns {
            styles, columns, ..
        } => {
            let mut out = format!("{pad}<div style=\"{}\">", normalize(styles));
            for column in columns {
                out.push('\n');
                out.push_str(&render_column(column, indent + 1));
            }
            out.push('\n');
            out.push_str(&pad);
            out.push_str("</div>");
            out
        }
        EmailComponent::TextImage {
            styles,
            content,
            src,
            alt,
            image_position,
            image_width,
            text_styles,
            image_styles,
            ..
        } => {
            let inner_pad = "  ".repeat(indent + 1);
            let image = format!(
                "{inner_pad}<img src=\"{src}\" alt=\"{alt}\" style=\"width: {image_width}; {}\">",
                normalize(image_styles)
            );
            let text = format!(
                "{inner_pad}<div style=\"{}\">{}</div>",
                normalize(text_styles),
                content
            );
            // Element order, not CSS `order`: email clients strip the latter.
            let (first, second) = match image_position {
                ImagePosition::Left => (image, text),
                ImagePosition::Right => (text, image),
            };
            format!(
                "{pad}<div style=\"{}display: flex; align-items: center; gap: 20px;\">\n{first}\n{second}\n{pad}</div>",
                normalize(styles)
            )
        }
        EmailComponent::Unknown => String::new(),
    }
}

fn render_column(column: &Column, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let mut out = format!("{pad}<div style=\"{}\">", normalize(&column.styles));
    let children = column
        .components
        .iter()
        .map(|component| render_node(component, indent + 1))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if !children.is_empty() {
        out.push('\n');
        out.push_str(&children);
    }
    out.push('\n');
    out.push_str(&pad);
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::templating::substitute;
    use crate::models::template::PageStyle;
    use serde_json::json;
    use std::collections::HashMap;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn component(raw: serde_json::Value) -> EmailComponent {
        serde_json::from_value(raw).unwrap()
    }

    fn template(components: Vec<EmailComponent>) -> Template {
        let now = OffsetDateTime::now_utc();
        Template {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            subject: "Hello {{firstName}}".to_string(),
            components,
            page_style: PageStyle::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn text_node_renders_inline_styles_and_content() {
        let node = component(json!({
            "type": "text",
            "id": "t1",
            "styles": { "fontSize": 16, "color": "#333" },
            "content": "Hello <strong>there</strong>"
        }));
        assert_eq!(
            render_node(&node, 0),
            "<div style=\"font-size: 16px; color: #333; \">Hello <strong>there</strong></div>"
        );
    }

    #[test]
    fn columns_render_nested_components_in_order() {
        let node = component(json!({
            "type": "columns",
            "id": "cols",
            "styles": {},
            "columns": [
                { "id": "c1", "styles": {}, "components": [
                    { "type": "text", "id": "ta", "styles": {}, "content": "A" }
                ]},
                { "id": "c2", "styles": {}, "components": [
                    { "type": "text", "id": "tb", "styles": {}, "content": "B" }
                ]}
            ]
        }));
        let html = render_node(&node, 0);
        let a = html.find(">A</div>").expect("column A rendered");
        let b = html.find(">B</div>").expect("column B rendered");
        assert!(a < b, "columns must keep their order");
        // One wrapper div per column plus the outer div.
        assert_eq!(html.matches("<div").count(), 5);
    }

    #[test]
    fn unknown_component_emits_nothing_and_spares_siblings() {
        let doc = render_document(&template(vec![
            component(json!({ "type": "text", "id": "t1", "content": "before" })),
            component(json!({ "type": "nonsense", "id": "x" })),
            component(json!({ "type": "text", "id": "t2", "content": "after" })),
        ]));
        assert!(doc.contains(">before</div>"));
        assert!(doc.contains(">after</div>"));
        assert!(!doc.contains("nonsense"));
    }

    #[test]
    fn render_document_is_idempotent() {
        let tpl = template(vec![
            component(json!({ "type": "button", "id": "b", "content": "Go", "styles": { "paddingY": 12 } })),
            component(json!({ "type": "divider", "id": "d", "styles": { "borderColor": "#eee" } })),
        ]);
        assert_eq!(render_document(&tpl), render_document(&tpl));
    }

    #[test]
    fn button_renders_personalized_anchor() {
        let tpl = template(vec![component(json!({
            "type": "button",
            "id": "cta",
            "content": "Hi {{firstName}}",
            "url": "https://x.com",
            "styles": { "backgroundColor": "#3B82F6", "paddingX": 20 }
        }))]);
        let html = render_document(&tpl);
        let personalized = substitute(
            &html,
            &HashMap::from([("firstName".to_string(), "Sam".to_string())]),
        );
        assert!(personalized.contains(
            "style=\"background-color: #3B82F6; padding-left: 20px; padding-right: 20px; \""
        ));
        assert!(personalized.contains("href=\"https://x.com\""));
        assert!(personalized.contains(">Hi Sam</a>"));
    }

    #[test]
    fn button_url_falls_back_to_hash() {
        let node = component(json!({ "type": "button", "id": "b", "content": "Go", "url": "" }));
        assert!(render_node(&node, 0).contains("href=\"#\""));
    }

    #[test]
    fn spacer_and_divider_render_without_content() {
        let spacer = component(json!({ "type": "spacer", "id": "s", "styles": { "height": 24 } }));
        assert_eq!(render_node(&spacer, 0), "<div style=\"height: 24px; \"></div>");

        let divider = component(json!({ "type": "divider", "id": "d", "styles": {} }));
        assert_eq!(render_node(&divider, 0), "<hr style=\"\">");
    }

    #[test]
    fn text_image_orders_elements_by_image_position() {
        let left = component(json!({
            "type": "text-image",
            "id": "ti",
            "content": "Copy",
            "src": "https://cdn.example.com/a.png",
            "alt": "a",
            "imagePosition": "left",
            "imageWidth": "200px"
        }));
        let html = render_node(&left, 0);
        assert!(html.contains("display: flex; align-items: center; gap: 20px;"));
        assert!(html.contains("width: 200px; "));
        let img = html.find("<img").unwrap();
        let text = html.find(">Copy</div>").unwrap();
        assert!(img < text, "left image renders before the text");

        let right = component(json!({
            "type": "text-image",
            "id": "ti2",
            "content": "Copy",
            "src": "https://cdn.example.com/a.png",
            "alt": "a",
            "imagePosition": "right",
            "imageWidth": "200px"
        }));
        let html = render_node(&right, 0);
        let img = html.find("<img").unwrap();
        let text = html.find(">Copy</div>").unwrap();
        assert!(text < img, "right image renders after the text");
    }

    #[test]
    fn document_carries_page_background_and_base_rules() {
        let mut tpl = template(vec![]);
        tpl.page_style.background_color = "#0f172a".to_string();
        tpl.page_style.background_image = Some("https://cdn.example.com/bg.png".to_string());
        let doc = render_document(&tpl);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("img { max-width: 100%; }"));
        assert!(doc.contains("background-color: #0f172a;"));
        assert!(doc.contains("background-image: url('https://cdn.example.com/bg.png');"));
        assert!(doc.contains("background-size: cover;"));
        assert!(doc.contains("background-repeat: no-repeat;"));
        assert!(doc.contains("background-position: center center;"));
        assert!(doc.contains("<div class=\"wrapper\">"));
    }

    #[test]
    fn default_page_style_is_white_with_no_image() {
        let doc = render_document(&template(vec![]));
        assert!(doc.contains("background-color: #ffffff;"));
        assert!(!doc.contains("background-image:"));
    }
}
