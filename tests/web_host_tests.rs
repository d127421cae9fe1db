#![cfg(all(target_arch = "wasm32", feature = "web-host"))]

use landing_rs::host::{ElementSpec, Host};
use landing_rs::platform_web::WebHost;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn interning_the_same_element_returns_the_same_id() {
    let host = WebHost::new().expect("browser host");
    let body = host.body().expect("body");
    assert_eq!(host.body(), Some(body));

    let element = host.element(body).expect("body element");
    assert_eq!(host.resolve(element), body);
}

#[wasm_bindgen_test]
fn removing_an_element_drops_its_subtree_from_the_arena() {
    let mut host = WebHost::new().expect("browser host");
    let body = host.body().expect("body");
    let panel = host
        .create_element(
            body,
            &ElementSpec::new("div")
                .with_class("arena-panel")
                .with_child(ElementSpec::new("span").with_class("arena-inner")),
        )
        .expect("panel created");
    let inner = host.query(".arena-inner").expect("inner span");
    let tracked = host.tracked_elements();

    assert!(host.remove_element(panel));
    assert_eq!(host.tracked_elements(), tracked - 2);
    assert!(host.element(panel).is_none());
    assert!(host.element(inner).is_none());
    assert!(!host.is_connected(panel));
    assert!(!host.remove_element(panel));
}

#[wasm_bindgen_test]
fn elements_detached_outside_the_host_are_swept() {
    let mut host = WebHost::new().expect("browser host");
    let body = host.body().expect("body");
    for _ in 0..200 {
        let id = host
            .create_element(body, &ElementSpec::new("div").with_class("arena-churn"))
            .expect("churn element");
        host.element(id).expect("live element").remove();
    }

    assert!(host.tracked_elements() <= 64);
    assert_eq!(host.body(), Some(body));
}
