use std::ops::Deref;
use tracing::debug;

use crate::components::locator::{AsComponent, FromElement};
use crate::components::Component;
use crate::session::element::ElementRef;
use crate::session::selector::By;
use crate::{Error, Result};

/// `<select>` element
///
/// Options are checked one at a time in document order, and the first match
/// is clicked.
#[derive(Debug, Clone)]
pub struct Dropdown {
    inner: Component,
}

impl Dropdown {
    /// Option children, in document order
    pub async fn options(&self) -> Result<Vec<Component>> {
        let label = format!("{} > option", self.inner.label());
        Ok(self
            .inner
            .element()
            .find_all(By::css("option"), &label)
            .await?
            .into_iter()
            .map(Component::new)
            .collect())
    }

    pub async fn select_option_by_value(&self, value: &str) -> Result<()> {
        for option in self.options().await? {
            if option.attribute("value").await?.as_deref() == Some(value) {
                debug!("{}: selecting value {}", self.inner.label(), value);
                return option.click().await;
            }
        }
        Err(Error::option_not_found(self.inner.label(), value))
    }

    /// Select the first option whose text contains `text`
    pub async fn select_option_by_text(&self, text: &str) -> Result<()> {
        for option in self.options().await? {
            if option.text().await?.contains(text) {
                debug!("{}: selecting text {}", self.inner.label(), text);
                return option.click().await;
            }
        }
        Err(Error::option_not_found(self.inner.label(), text))
    }

    /// Select the first option that is shown and not disabled
    pub async fn select_first_available_option(&self) -> Result<()> {
        for option in self.options().await? {
            if option.is_displayed().await && option.attribute("disabled").await?.is_none() {
                return option.click().await;
            }
        }
        Err(Error::no_available_option(self.inner.label()))
    }

    /// Text of the selected option, if any
    pub async fn selected_text(&self) -> Result<Option<String>> {
        for option in self.options().await? {
            if option.element().is_selected().await? {
                return Ok(Some(option.text().await?));
            }
        }
        Ok(None)
    }
}

impl FromElement for Dropdown {
    fn from_element(element: ElementRef) -> Self {
        Self {
            inner: Component::new(element),
        }
    }
}

impl AsComponent for Dropdown {
    fn component(&self) -> &Component {
        &self.inner
    }
}

impl Deref for Dropdown {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.inner
    }
}
