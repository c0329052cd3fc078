//! Site-wide header
//!
//! Built from the page's browser handle, so every page shares one way to
//! search, reach the cart and read the cart badge.

use tracing::debug;

use crate::components::{Button, Component, Locator, Locators, TextInput};
use crate::session::browser::Browser;
use crate::session::keys::KeyInput;
use crate::session::selector::By;
use crate::wait::{self, Condition};
use crate::Result;

/// Selectors of the header slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSelectors {
    pub logo: By,
    pub search_input: By,
    pub search_button: By,
    pub cart_link: By,
    pub cart_badge: By,
    pub account_link: By,
}

impl Default for HeaderSelectors {
    fn default() -> Self {
        Self {
            logo: By::css("header .logo"),
            search_input: By::css("header input[type='search']"),
            search_button: By::css("header button[type='submit']"),
            cart_link: By::css("header a[href*='cart']"),
            cart_badge: By::css("header .cart-count"),
            account_link: By::css("header a[href*='account']"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    pub logo: Locator<Component>,
    pub search_input: Locator<TextInput>,
    pub search_button: Locator<Button>,
    pub cart_link: Locator<Component>,
    pub cart_badge: Locator<Component>,
    pub account_link: Locator<Component>,
}

impl Header {
    pub fn new(browser: &Browser) -> Self {
        Self::with_selectors(browser, HeaderSelectors::default())
    }

    pub fn with_selectors(browser: &Browser, selectors: HeaderSelectors) -> Self {
        let slots = Locators::new(browser);
        Self {
            logo: slots.component(selectors.logo, "headerLogo"),
            search_input: slots.text_input(selectors.search_input, "headerSearchInput"),
            search_button: slots.button(selectors.search_button, "headerSearchButton"),
            cart_link: slots.component(selectors.cart_link, "headerCartLink"),
            cart_badge: slots.component(selectors.cart_badge, "headerCartBadge"),
            account_link: slots.component(selectors.account_link, "headerAccountLink"),
        }
    }

    pub async fn search(&self, term: &str) -> Result<()> {
        debug!("Header search: {}", term);
        self.search_input
            .get()
            .clear_and_type([KeyInput::from(term)])
            .await?;
        self.search_button.get().click().await
    }

    pub async fn open_cart(&self) -> Result<()> {
        self.cart_link.get().click().await
    }

    pub async fn open_account(&self) -> Result<()> {
        self.account_link.get().click().await
    }

    /// Number on the cart badge; a hidden or empty badge counts as zero
    pub async fn cart_count(&self) -> Result<u32> {
        let badge = self.cart_badge.get();
        if !badge.is_displayed().await {
            return Ok(0);
        }
        let digits: String = badge
            .text()
            .await?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        Ok(digits.parse().unwrap_or(0))
    }

    /// Header rendered; pages can fold this into their own load condition
    pub fn is_visible(&self) -> Condition {
        let logo = self.logo.clone();
        wait::element_is_visible(move || logo.get())
    }
}
