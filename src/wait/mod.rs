//! # Wait conditions
//!
//! A `Condition` is a named async predicate over the browser. `Browser::wait`
//! polls one; `Browser::wait_any` polls several in order and stops at the
//! first that holds. Conditions compose with `any_of`, `all_of` and `not`.
//!
//! ## Example
//! ```rust,no_run
//! use storefront_pom::wait::{self, url_contains_value};
//! use storefront_pom::{Browser, By, Locators};
//! use std::time::Duration;
//!
//! # async fn example(browser: Browser) -> storefront_pom::Result<()> {
//! let slots = Locators::new(&browser);
//! let banner = slots.component(By::class("order-confirmed"), "confirmation");
//!
//! let done = wait::element_is_visible(move || banner.get());
//! browser
//!     .wait_any(vec![done, url_contains_value("/thank-you")], Some(Duration::from_secs(30)), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod conditions;


pub use condition::Condition;
pub use conditions::{
    all_of, any_of, element_has_text, element_is_not_visible, element_is_present,
    element_is_visible, not, page_has_loaded, url_changed, url_contains_value, url_is_value,
    url_matches,
};
