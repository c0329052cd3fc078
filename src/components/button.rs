use std::ops::Deref;

use crate::components::locator::{AsComponent, FromElement};
use crate::components::Component;
use crate::session::element::ElementRef;
use crate::Result;

/// Clickable button
#[derive(Debug, Clone)]
pub struct Button {
    inner: Component,
}

impl Button {
    /// Disabled when the `disabled` attribute reads `"disabled"`
    pub async fn is_disabled(&self) -> Result<bool> {
        Ok(self.inner.attribute("disabled").await?.as_deref() == Some("disabled"))
    }
}

impl FromElement for Button {
    fn from_element(element: ElementRef) -> Self {
        Self {
            inner: Component::new(element),
        }
    }
}

impl AsComponent for Button {
    fn component(&self) -> &Component {
        &self.inner
    }
}

impl Deref for Button {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.inner
    }
}
