//! Acceptance tests
//!
//! Behavioural guarantees of the page-object layer, checked against the
//! scripted in-memory session.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{quick_settings, seed_product_page, shop_config, ProductPage};
use storefront_pom::wait::{self, url_contains_value};
use storefront_pom::{
    Browser, By, Condition, Error, Locators, MockNode, MockSession, Page, PageBase,
};

// ============= Lazy lookup =============

#[tokio::test]
async fn test_each_locator_read_is_a_new_lookup() {
    let mock = MockSession::new();
    mock.add(By::id("promo"), MockNode::new().text("Free shipping"));
    let promo = Locators::new(&mock.browser()).component(By::id("promo"), "promoBanner");

    assert_eq!(mock.lookups(), 0);
    assert_eq!(promo.get().text().await.unwrap(), "Free shipping");
    assert_eq!(promo.get().text().await.unwrap(), "Free shipping");
    assert_eq!(mock.lookups_for(&By::id("promo")), 2);
}

#[tokio::test]
async fn test_is_displayed_is_false_when_nothing_matches() {
    let mock = MockSession::new();
    let banner = Locators::new(&mock.browser()).component(By::css(".banner"), "banner");

    assert!(!banner.get().is_displayed().await);
    assert!(!banner.get().is_present().await);
}

// ============= Click fallback =============

#[tokio::test]
async fn test_click_falls_back_to_script_exactly_once() {
    let mock = MockSession::new();
    let covered = mock.add(
        By::id("buy"),
        MockNode::new().refuse_click("element click intercepted"),
    );
    let clean = mock.add(By::id("wishlist"), MockNode::new());
    let slots = Locators::new(&mock.browser());

    slots.button(By::id("buy"), "buyButton").get().click().await.unwrap();
    assert_eq!(mock.native_clicks(&covered), 1);
    assert_eq!(mock.script_clicks(&covered), 1);

    slots.button(By::id("wishlist"), "wishlistButton").get().click().await.unwrap();
    assert_eq!(mock.native_clicks(&clean), 1);
    assert_eq!(mock.script_clicks(&clean), 0);
}

#[tokio::test]
async fn test_click_surfaces_native_error_when_both_fail() {
    let mock = MockSession::new();
    let dead = mock.add(
        By::id("buy"),
        MockNode::new()
            .refuse_click("element click intercepted")
            .refuse_script("el is not clickable"),
    );
    let buy = Locators::new(&mock.browser()).button(By::id("buy"), "buyButton");

    match buy.get().click().await {
        Err(Error::Click { label, source }) => {
            assert_eq!(label, "By: id, On: buyButton");
            assert!(source.to_string().contains("element click intercepted"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(mock.script_clicks(&dead), 1);
}

// ============= Waits =============

#[tokio::test]
async fn test_wait_returns_as_soon_as_condition_holds() {
    let browser = MockSession::new().browser();
    let started = Instant::now();

    browser
        .wait(
            Condition::new("always", |_| async { Ok(true) }),
            Some(Duration::from_secs(5)),
            None,
        )
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_wait_times_out_on_false_and_erroring_conditions() {
    let browser = MockSession::new().browser_with(quick_settings());

    let never = Condition::new("cart badge updated", |_| async { Ok(false) });
    match browser.wait(never, None, None).await {
        Err(Error::WaitTimeout { timeout_ms, message }) => {
            assert_eq!(timeout_ms, 150);
            assert_eq!(message, "cart badge updated");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let raising = Condition::new("raises", |_| async { Err(Error::script("boom")) });
    assert!(matches!(
        browser.wait(raising, None, Some("payment frame")).await,
        Err(Error::WaitTimeout { .. })
    ));
}

#[tokio::test]
async fn test_wait_any_tolerates_an_always_erroring_condition() {
    let mock = MockSession::new();
    let browser = mock.browser();
    let errors = Arc::new(AtomicUsize::new(0));

    let raising = {
        let errors = errors.clone();
        Condition::new("raises", move |_| {
            errors.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::script("boom")) }
        })
    };

    let later = mock.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        later.set_url("https://example.test/order/confirmation");
    });

    browser
        .wait_any(
            vec![raising, url_contains_value("confirmation")],
            Some(Duration::from_millis(500)),
            None,
        )
        .await
        .unwrap();
    assert!(errors.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_wait_any_accepts_a_single_condition() {
    let mock = MockSession::new();
    mock.set_url("https://example.test/cart");
    let browser = mock.browser();

    browser
        .wait_any(url_contains_value("cart"), None, None)
        .await
        .unwrap();
}

// ============= Pages =============

#[tokio::test]
async fn test_navigate_without_url_is_rejected_locally() {
    let mock = MockSession::new();
    let page = ProductPage::new(PageBase::new(&mock.browser(), "ProductPage"));

    assert!(matches!(page.navigate().await, Err(Error::MissingUrl(_))));
    assert!(mock.navigations().is_empty());
    assert_eq!(mock.lookups(), 0);
}

#[tokio::test]
async fn test_url_conditions_after_navigation() {
    let mock = MockSession::new();
    let browser = Browser::new(Arc::new(mock.clone()), &shop_config());

    browser.navigate("https://example.test/cart").await.unwrap();

    assert!(url_contains_value("cart").evaluate(&browser).await.unwrap());
    assert!(!url_contains_value("checkout").evaluate(&browser).await.unwrap());
}

// ============= Wrappers =============

#[tokio::test]
async fn test_check_only_clicks_when_state_changes() {
    let mock = MockSession::new();
    let fixture = seed_product_page(&mock);
    let page = ProductPage::new(PageBase::new(&mock.browser(), "ProductPage"));

    page.gift_wrap.get().check().await.unwrap();
    assert_eq!(mock.native_clicks(&fixture.gift_wrap), 1);
    assert!(page.gift_wrap.get().is_checked().await.unwrap());

    page.gift_wrap.get().check().await.unwrap();
    assert_eq!(mock.native_clicks(&fixture.gift_wrap), 1);
}

#[tokio::test]
async fn test_select_option_by_value_clicks_only_the_match() {
    let mock = MockSession::new();
    let select = mock.add(By::id("qty"), MockNode::new());
    let options: Vec<_> = [("10", "Ten"), ("20", "Twenty"), ("30", "Thirty")]
        .iter()
        .map(|(value, text)| mock.add_child(&select, By::css("option"), MockNode::option(value, text)))
        .collect();
    let qty = Locators::new(&mock.browser()).dropdown(By::id("qty"), "qtyDropdown");

    qty.get().select_option_by_value("20").await.unwrap();
    assert_eq!(mock.native_clicks(&options[0]), 0);
    assert_eq!(mock.native_clicks(&options[1]), 1);
    assert_eq!(mock.native_clicks(&options[2]), 0);
    assert_eq!(qty.get().selected_text().await.unwrap().as_deref(), Some("Twenty"));

    match qty.get().select_option_by_value("99").await {
        Err(Error::OptionNotFound { wanted, .. }) => assert_eq!(wanted, "99"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(mock.total_native_clicks(), 1);
}

#[test]
fn test_page_load_condition_is_the_page_own() {
    let mock = MockSession::new();
    seed_product_page(&mock);
    let page = ProductPage::new(PageBase::new(&mock.browser(), "ProductPage"));

    let loaded = wait::page_has_loaded(&page);
    assert_eq!(loaded.name(), "ProductPage has loaded");
    assert!(tokio_test::block_on(loaded.evaluate(page.browser())).unwrap());
}
