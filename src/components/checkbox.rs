use std::ops::Deref;
use tracing::trace;

use crate::components::locator::{AsComponent, FromElement};
use crate::components::Component;
use crate::session::element::ElementRef;
use crate::Result;

/// Checkbox; `check` and `uncheck` only click when the state differs
#[derive(Debug, Clone)]
pub struct Checkbox {
    inner: Component,
}

impl Checkbox {
    pub async fn is_checked(&self) -> Result<bool> {
        self.inner.element().is_selected().await
    }

    pub async fn check(&self) -> Result<()> {
        self.set(true).await
    }

    pub async fn uncheck(&self) -> Result<()> {
        self.set(false).await
    }

    async fn set(&self, checked: bool) -> Result<()> {
        if self.is_checked().await? == checked {
            trace!("{} already {}", self.inner.label(), if checked { "checked" } else { "unchecked" });
            return Ok(());
        }
        self.inner.click().await
    }
}

impl FromElement for Checkbox {
    fn from_element(element: ElementRef) -> Self {
        Self {
            inner: Component::new(element),
        }
    }
}

impl AsComponent for Checkbox {
    fn component(&self) -> &Component {
        &self.inner
    }
}

impl Deref for Checkbox {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.inner
    }
}
