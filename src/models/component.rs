use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visual properties attached to a component, keyed the way the editor emits
/// them (camelCase, values either CSS strings or bare numbers). Insertion
/// order is preserved and is the order declarations are inlined in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StyleMap(pub Map<String, Value>);

impl StyleMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        StyleMap(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

/// One element of an email layout. The discriminant matches the editor's
/// `type` field; anything it does not recognize collapses to `Unknown` so
/// newer documents still load (and render as nothing) on older builds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EmailComponent {
    Text {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        content: String,
    },
    Image {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        src: String,
        #[serde(default)]
        alt: String,
    },
    Button {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        content: String,
        #[serde(default = "default_button_url")]
        url: String,
    },
    Divider {
        id: String,
        #[serde(default)]
        styles: StyleMap,
    },
    Spacer {
        id: String,
        #[serde(default)]
        styles: StyleMap,
    },
    Container {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        content: String,
    },
    Columns {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        columns: Vec<Column>,
    },
    #[serde(rename_all = "camelCase")]
    TextImage {
        id: String,
        #[serde(default)]
        styles: StyleMap,
        #[serde(default)]
        content: String,
        #[serde(default)]
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        image_position: ImagePosition,
        #[serde(default = "default_image_width")]
        image_width: String,
        #[serde(default)]
        text_styles: StyleMap,
        #[serde(default)]
        image_styles: StyleMap,
    },
    #[serde(other)]
    Unknown,
}

fn default_button_url() -> String {
    "#".to_string()
}

fn default_image_width() -> String {
    "40%".to_string()
}

impl EmailComponent {
    pub fn id(&self) -> Option<&str> {
        match self {
            EmailComponent::Text { id, .. }
            | EmailComponent::Image { id, .. }
            | EmailComponent::Button { id, .. }
            | EmailComponent::Divider { id, .. }
            | EmailComponent::Spacer { id, .. }
            | EmailComponent::Container { id, .. }
            | EmailComponent::Columns { id, .. }
            | EmailComponent::TextImage { id, .. } => Some(id),
            EmailComponent::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub id: String,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub components: Vec<EmailComponent>,
}
