//! # Browser session layer
//!
//! The browser handle, lazy element references and the `BrowserSession` seam
//! between them and the remote browser.
//!
//! ## Module structure
//! - `traits`: the `BrowserSession` interface, node handles and cookies
//! - `selector`: `By` selector strategies
//! - `keys`: keystroke sequences and special keys
//! - `scripts`: page scripts run against tagged nodes
//! - `element`: deferred `ElementRef` and `ElementList`
//! - `browser`: the `Browser` handle and the wait loop
//! - `remote`: CDP-backed session
//! - `mock`: programmable session for tests
//!
//! ## Example
//! ```rust,no_run
//! use storefront_pom::{Browser, By, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None)?;
//! let browser = Browser::connect(&config).await?;
//! browser.navigate(&config.page_url("/cart")?).await?;
//!
//! let checkout = browser.find_element(By::id("checkout"));
//! checkout.click().await?;
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod selector;
pub mod keys;
pub mod scripts;
pub mod element;
pub mod browser;
pub mod remote;
pub mod mock;


pub use traits::{BrowserSession, Cookie, NodeId, SameSite};
pub use selector::{By, Strategy};
pub use keys::{Key, KeyInput};
pub use element::{ElementList, ElementRef};
pub use browser::{Browser, WaitSettings};
pub use remote::RemoteSession;
pub use mock::{MockNode, MockSession};
