//! # Page objects
//!
//! A page object embeds a `PageBase` (browser, name, optional URL, shared
//! header) and implements `Page` by supplying its load condition. Navigation
//! goes to the page URL and then waits for that condition.
//!
//! ## Example
//! ```rust,no_run
//! use storefront_pom::page::{Page, PageBase};
//! use storefront_pom::wait::{self, Condition};
//! use storefront_pom::{Browser, By, Config, Locator, Locators, TextInput};
//!
//! struct SearchPage {
//!     base: PageBase,
//!     query: Locator<TextInput>,
//! }
//!
//! impl SearchPage {
//!     fn new(browser: &Browser, config: &Config) -> storefront_pom::Result<Self> {
//!         let slots = Locators::new(browser);
//!         Ok(Self {
//!             base: PageBase::new(browser, "SearchPage").with_path(config, "/search")?,
//!             query: slots.text_input(By::name("q"), "queryInput"),
//!         })
//!     }
//! }
//!
//! impl Page for SearchPage {
//!     fn base(&self) -> &PageBase {
//!         &self.base
//!     }
//!
//!     fn load_condition(&self) -> Condition {
//!         let query = self.query.clone();
//!         wait::element_is_visible(move || query.get())
//!     }
//! }
//! ```

pub mod base;
pub mod header;


pub use base::{Page, PageBase};
pub use header::{Header, HeaderSelectors};
