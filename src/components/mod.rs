//! # Component wrappers
//!
//! Typed wrappers over lazy element references. Page objects hold
//! `Locator<W>` slots and call `get()` to obtain a wrapper bound to the
//! current DOM.
//!
//! ## Module structure
//! - `component`: base `Component` (visibility, fallback click, text)
//! - `button`, `text_input`, `checkbox`, `dropdown`: single-element wrappers
//! - `collection`: every element matching a selector
//! - `locator`: `Locator` slots and the `Locators` factory

pub mod component;
pub mod button;
pub mod text_input;
pub mod checkbox;
pub mod dropdown;
pub mod collection;
pub mod locator;


pub use component::Component;
pub use button::Button;
pub use text_input::TextInput;
pub use checkbox::Checkbox;
pub use dropdown::Dropdown;
pub use collection::Collection;
pub use locator::{AsComponent, Bind, FromElement, Locator, Locators};
