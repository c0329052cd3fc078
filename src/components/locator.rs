//! Locator binding
//!
//! A page object declares its slots once through `Locators`; each slot is a
//! `Locator<W>` whose `get()` builds a new wrapper over a new lazy element.
//! Nothing is cached between reads, so a slot always reflects the current DOM.

use std::fmt;
use std::marker::PhantomData;

use crate::components::{Button, Checkbox, Collection, Component, Dropdown, TextInput};
use crate::session::browser::Browser;
use crate::session::element::ElementRef;
use crate::session::selector::By;

/// Wrapper built over a single element
pub trait FromElement: Sized {
    fn from_element(element: ElementRef) -> Self;
}

/// Access to a wrapper's base component
pub trait AsComponent {
    fn component(&self) -> &Component;
}

impl AsComponent for Component {
    fn component(&self) -> &Component {
        self
    }
}

impl FromElement for Component {
    fn from_element(element: ElementRef) -> Self {
        Component::new(element)
    }
}

/// Anything a locator slot can produce
pub trait Bind: Sized {
    fn bind(browser: &Browser, selector: &By, label: &str) -> Self;
}

impl<W: FromElement> Bind for W {
    fn bind(browser: &Browser, selector: &By, label: &str) -> Self {
        W::from_element(browser.find_element_labeled(selector.clone(), label))
    }
}

/// Lazily bound page slot
pub struct Locator<W> {
    browser: Browser,
    selector: By,
    label: String,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: Bind> Locator<W> {
    pub fn new(browser: &Browser, selector: By, name: &str) -> Self {
        Self {
            browser: browser.clone(),
            label: selector.label_for(name),
            selector,
            _wrapper: PhantomData,
        }
    }

    /// New wrapper over a new, unresolved element
    pub fn get(&self) -> W {
        W::bind(&self.browser, &self.selector, &self.label)
    }

    pub fn selector(&self) -> &By {
        &self.selector
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<W> Clone for Locator<W> {
    fn clone(&self) -> Self {
        Self {
            browser: self.browser.clone(),
            selector: self.selector.clone(),
            label: self.label.clone(),
            _wrapper: PhantomData,
        }
    }
}

impl<W> fmt::Debug for Locator<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("selector", &self.selector)
            .field("label", &self.label)
            .finish()
    }
}

/// Slot factory bound to one browser
#[derive(Debug, Clone)]
pub struct Locators {
    browser: Browser,
}

impl Locators {
    pub fn new(browser: &Browser) -> Self {
        Self {
            browser: browser.clone(),
        }
    }

    pub fn bind<W: Bind>(&self, selector: By, name: &str) -> Locator<W> {
        Locator::new(&self.browser, selector, name)
    }

    pub fn component(&self, selector: By, name: &str) -> Locator<Component> {
        self.bind(selector, name)
    }

    pub fn button(&self, selector: By, name: &str) -> Locator<Button> {
        self.bind(selector, name)
    }

    pub fn text_input(&self, selector: By, name: &str) -> Locator<TextInput> {
        self.bind(selector, name)
    }

    pub fn checkbox(&self, selector: By, name: &str) -> Locator<Checkbox> {
        self.bind(selector, name)
    }

    pub fn dropdown(&self, selector: By, name: &str) -> Locator<Dropdown> {
        self.bind(selector, name)
    }

    /// Slot over every matching element
    pub fn all(&self, selector: By, name: &str) -> Locator<Collection> {
        self.bind(selector, name)
    }
}
