use crate::components::locator::Bind;
use crate::components::Component;
use crate::session::browser::Browser;
use crate::session::element::ElementList;
use crate::session::selector::By;
use crate::Result;

/// Every element matching a selector
#[derive(Debug, Clone)]
pub struct Collection {
    elements: ElementList,
}

impl Collection {
    pub fn new(elements: ElementList) -> Self {
        Self { elements }
    }

    pub fn label(&self) -> &str {
        self.elements.label()
    }

    /// All matches; an empty page gives an empty list
    pub async fn get_elements(&self) -> Result<Vec<Component>> {
        Ok(self
            .elements
            .resolve()
            .await?
            .into_iter()
            .map(Component::new)
            .collect())
    }

    /// Matches that are currently shown
    pub async fn get_displayed(&self) -> Result<Vec<Component>> {
        let mut displayed = Vec::new();
        for component in self.get_elements().await? {
            if component.is_displayed().await {
                displayed.push(component);
            }
        }
        Ok(displayed)
    }

    pub async fn len(&self) -> Result<usize> {
        Ok(self.elements.resolve().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn texts(&self) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        for component in self.get_elements().await? {
            texts.push(component.text().await?);
        }
        Ok(texts)
    }
}

impl Bind for Collection {
    fn bind(browser: &Browser, selector: &By, label: &str) -> Self {
        Collection::new(browser.find_elements_labeled(selector.clone(), label))
    }
}
