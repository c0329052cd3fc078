//! Common test utilities
//!
//! Shared fixtures for the integration tests: a storefront config, a scripted
//! session with a product listing, and small page objects built on top.

#![allow(dead_code)]

use std::time::Duration;

use storefront_pom::session::NodeId;
use storefront_pom::wait::{self, Condition};
use storefront_pom::{
    By, Config, Dropdown, Locator, Locators, MockNode, MockSession, Page, PageBase, TextInput,
    Button, Collection, Component, Checkbox, WaitSettings,
};

pub const BASE_URL: &str = "https://example.test";

/// Config pointing at the stub storefront
pub fn shop_config() -> Config {
    Config {
        base_url: BASE_URL.to_string(),
        wait_timeout_ms: 300,
        long_wait_timeout_ms: 600,
        poll_interval_ms: 10,
        log_level: "debug".to_string(),
        ..Default::default()
    }
}

/// Short waits so timeout paths finish quickly
pub fn quick_settings() -> WaitSettings {
    WaitSettings {
        timeout: Duration::from_millis(150),
        long_timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(10),
    }
}

/// Node ids of a seeded product page
pub struct ProductFixture {
    pub size: NodeId,
    pub options: Vec<NodeId>,
    pub quantity: NodeId,
    pub gift_wrap: NodeId,
    pub add_to_cart: NodeId,
}

/// Seed a product page: size dropdown, quantity field, gift-wrap box, add button
pub fn seed_product_page(mock: &MockSession) -> ProductFixture {
    let size = mock.add(By::id("size"), MockNode::new());
    let options = [("s", "Small"), ("m", "Medium"), ("l", "Large")]
        .iter()
        .map(|(value, text)| mock.add_child(&size, By::css("option"), MockNode::option(value, text)))
        .collect();
    let quantity = mock.add(By::name("quantity"), MockNode::new().value("1"));
    let gift_wrap = mock.add(By::id("gift-wrap"), MockNode::checkbox(false));
    let add_to_cart = mock.add(
        By::css("button.add-to-cart"),
        MockNode::new().text("Add to cart"),
    );
    ProductFixture {
        size,
        options,
        quantity,
        gift_wrap,
        add_to_cart,
    }
}

/// Product detail page used by the end-to-end scenarios
pub struct ProductPage {
    base: PageBase,
    pub size: Locator<Dropdown>,
    pub quantity: Locator<TextInput>,
    pub gift_wrap: Locator<Checkbox>,
    pub add_to_cart: Locator<Button>,
    pub reviews: Locator<Collection>,
    pub added_toast: Locator<Component>,
}

impl ProductPage {
    pub fn new(base: PageBase) -> Self {
        let slots: Locators = base.locators();
        Self {
            size: slots.dropdown(By::id("size"), "sizeDropdown"),
            quantity: slots.text_input(By::name("quantity"), "quantityInput"),
            gift_wrap: slots.checkbox(By::id("gift-wrap"), "giftWrapCheckbox"),
            add_to_cart: slots.button(By::css("button.add-to-cart"), "addToCartButton"),
            reviews: slots.all(By::css(".review"), "reviews"),
            added_toast: slots.component(By::css(".toast-added"), "addedToast"),
            base,
        }
    }
}

impl Page for ProductPage {
    fn base(&self) -> &PageBase {
        &self.base
    }

    fn load_condition(&self) -> Condition {
        let button = self.add_to_cart.clone();
        wait::element_is_visible(move || button.get())
    }
}
