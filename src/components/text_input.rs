use std::ops::Deref;

use crate::components::locator::{AsComponent, FromElement};
use crate::components::Component;
use crate::session::element::ElementRef;
use crate::session::keys::{self, KeyInput};
use crate::Result;

/// Editable text field
#[derive(Debug, Clone)]
pub struct TextInput {
    inner: Component,
}

impl TextInput {
    /// Send a keystroke sequence of text, numbers and special keys
    pub async fn type_keys<I, K>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyInput>,
    {
        let encoded = keys::encode(keys);
        self.inner.element().send_keys(&encoded).await
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.element().send_keys(text).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.inner.element().clear().await
    }

    pub async fn clear_and_type<I, K>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyInput>,
    {
        self.clear().await?;
        self.type_keys(keys).await
    }

    /// Current `value` property
    pub async fn value(&self) -> Result<String> {
        Ok(match self.inner.element().property("value").await? {
            serde_json::Value::String(value) => value,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

impl FromElement for TextInput {
    fn from_element(element: ElementRef) -> Self {
        Self {
            inner: Component::new(element),
        }
    }
}

impl AsComponent for TextInput {
    fn component(&self) -> &Component {
        &self.inner
    }
}

impl Deref for TextInput {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.inner
    }
}
