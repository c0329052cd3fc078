use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::session::browser::Browser;
use crate::Result;

type Check = dyn Fn(Browser) -> BoxFuture<'static, Result<bool>> + Send + Sync;

/// Named predicate over the browser, polled by `Browser::wait`
#[derive(Clone)]
pub struct Condition {
    name: String,
    check: Arc<Check>,
}

impl Condition {
    pub fn new<N, F, Fut>(name: N, check: F) -> Self
    where
        N: Into<String>,
        F: Fn(Browser) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool>> + Send + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(move |browser| Box::pin(check(browser))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same check under a different name
    pub fn named<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Evaluate once
    pub async fn evaluate(&self, browser: &Browser) -> Result<bool> {
        (self.check)(browser.clone()).await
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("name", &self.name).finish()
    }
}

impl From<Condition> for Vec<Condition> {
    fn from(condition: Condition) -> Self {
        vec![condition]
    }
}
