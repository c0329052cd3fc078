//! Condition constructors
//!
//! Element conditions take a factory closure rather than a wrapper, so every
//! poll works on a freshly bound element.

use std::sync::Arc;

use crate::components::AsComponent;
use crate::page::Page;
use crate::wait::Condition;

fn label_of<F, C>(locate: &F) -> String
where
    F: Fn() -> C,
    C: AsComponent,
{
    locate().component().label().to_string()
}

/// Element exists and is shown
pub fn element_is_visible<F, C>(locate: F) -> Condition
where
    F: Fn() -> C + Send + Sync + 'static,
    C: AsComponent + Send + Sync + 'static,
{
    let name = format!("{} is visible", label_of(&locate));
    let locate = Arc::new(locate);
    Condition::new(name, move |_| {
        let target = (*locate)();
        async move { Ok(target.component().is_displayed().await) }
    })
}

/// Element is absent or hidden
pub fn element_is_not_visible<F, C>(locate: F) -> Condition
where
    F: Fn() -> C + Send + Sync + 'static,
    C: AsComponent + Send + Sync + 'static,
{
    let name = format!("{} is not visible", label_of(&locate));
    let locate = Arc::new(locate);
    Condition::new(name, move |_| {
        let target = (*locate)();
        async move { Ok(!target.component().is_displayed().await) }
    })
}

/// Element lookup succeeds
pub fn element_is_present<F, C>(locate: F) -> Condition
where
    F: Fn() -> C + Send + Sync + 'static,
    C: AsComponent + Send + Sync + 'static,
{
    let name = format!("{} is present", label_of(&locate));
    let locate = Arc::new(locate);
    Condition::new(name, move |_| {
        let target = (*locate)();
        async move { Ok(target.component().is_present().await) }
    })
}

/// Element text contains `expected`
pub fn element_has_text<F, C>(locate: F, expected: &str) -> Condition
where
    F: Fn() -> C + Send + Sync + 'static,
    C: AsComponent + Send + Sync + 'static,
{
    let name = format!("{} has text '{}'", label_of(&locate), expected);
    let locate = Arc::new(locate);
    let expected = expected.to_string();
    Condition::new(name, move |_| {
        let target = (*locate)();
        let expected = expected.clone();
        async move { Ok(target.component().text().await?.contains(&expected)) }
    })
}

/// Current URL equals `url`
pub fn url_is_value(url: &str) -> Condition {
    let url = url.to_string();
    Condition::new(format!("URL is {}", url), move |browser| {
        let url = url.clone();
        async move { Ok(browser.current_url().await? == url) }
    })
}

/// Current URL contains `partial`
pub fn url_contains_value(partial: &str) -> Condition {
    let partial = partial.to_string();
    Condition::new(format!("URL contains {}", partial), move |browser| {
        let partial = partial.clone();
        async move { Ok(browser.current_url().await?.contains(&partial)) }
    })
}

/// Current URL differs from `previous`
pub fn url_changed(previous: &str) -> Condition {
    let previous = previous.to_string();
    Condition::new(format!("URL changed from {}", previous), move |browser| {
        let previous = previous.clone();
        async move { Ok(browser.current_url().await? != previous) }
    })
}

/// Current URL satisfies `predicate`
pub fn url_matches<P>(name: &str, predicate: P) -> Condition
where
    P: Fn(&str) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    Condition::new(format!("URL {}", name), move |browser| {
        let predicate = Arc::clone(&predicate);
        async move {
            let url = browser.current_url().await?;
            Ok((*predicate)(&url))
        }
    })
}

/// The page's own load condition
pub fn page_has_loaded<P: Page + ?Sized>(page: &P) -> Condition {
    page.load_condition().named(format!("{} has loaded", page.name()))
}

/// Holds when any condition holds; checked in order, errors count as false
pub fn any_of(conditions: impl Into<Vec<Condition>>) -> Condition {
    let conditions: Vec<Condition> = conditions.into();
    let conditions: Arc<[Condition]> = conditions.into();
    let name = join_names(&conditions, " or ");
    Condition::new(name, move |browser| {
        let conditions = Arc::clone(&conditions);
        async move {
            for condition in conditions.iter() {
                if let Ok(true) = condition.evaluate(&browser).await {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    })
}

/// Holds when every condition holds; stops at the first that does not
pub fn all_of(conditions: impl Into<Vec<Condition>>) -> Condition {
    let conditions: Vec<Condition> = conditions.into();
    let conditions: Arc<[Condition]> = conditions.into();
    let name = join_names(&conditions, " and ");
    Condition::new(name, move |browser| {
        let conditions = Arc::clone(&conditions);
        async move {
            for condition in conditions.iter() {
                if !condition.evaluate(&browser).await? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    })
}

/// Negation; errors are passed through
pub fn not(condition: Condition) -> Condition {
    let name = format!("not ({})", condition.name());
    Condition::new(name, move |browser| {
        let condition = condition.clone();
        async move { Ok(!condition.evaluate(&browser).await?) }
    })
}

fn join_names(conditions: &[Condition], separator: &str) -> String {
    conditions
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(separator)
}
