use super::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn run(html: &str) -> (PartialRecord, Vec<ExtractionIssue>) {
    let page = Page::parse(html);
    let mut issues = Vec::new();
    let partial = HydrationStrategy::new(3).try_extract(&page, &mut issues);
    (partial, issues)
}

// -----------------------------------------------------------------------
// find_payloads
// -----------------------------------------------------------------------

#[test]
fn finds_tagged_and_assigned_payloads_in_order() {
    let page = Page::parse(
        r#"<html><body>
        <script id="__NEXT_DATA__" type="application/json">{"props":{}}</script>
        <script>window.dataLayer = []; window.__INITIAL_STATE__ = {"a":1}; window.x = 2;</script>
        <script>var __PRELOADED_STATE__ = JSON.parse("{\"b\":2}");</script>
        <script type="application/ld+json">{"@type":"Product"}</script>
        <script>console.log("nada")</script>
        </body></html>"#,
    );
    let payloads = find_payloads(&page);
    let markers: Vec<&str> = payloads.iter().map(|p| p.marker.as_str()).collect();
    assert_eq!(
        markers,
        vec!["__NEXT_DATA__", "__INITIAL_STATE__", "__PRELOADED_STATE__"]
    );
    assert_eq!(payloads[1].json, r#"{"a":1}"#);
    assert_eq!(payloads[2].json, r#"{"b":2}"#);
}

#[test]
fn tagged_payload_tolerates_trailing_semicolon() {
    let page = Page::parse(r#"<script id="__NEXT_DATA__">{"a":1};</script>"#);
    assert_eq!(find_payloads(&page)[0].json, r#"{"a":1}"#);
}

// -----------------------------------------------------------------------
// key scan
// -----------------------------------------------------------------------

#[test]
fn next_data_flat_state() {
    let (partial, issues) = run(
        r#"<script id="__NEXT_DATA__" type="application/json">
        {"props":{"pageProps":{"product":{"productName":"Camiseta Básica","brand":"Hering","price":49.9}}}}
        </script>"#,
    );
    assert!(issues.is_empty());
    assert_eq!(partial.name.as_deref(), Some("Camiseta Básica"));
    assert_eq!(partial.brand.as_deref(), Some("Hering"));
    assert_eq!(partial.quote.unwrap().price, Some(dec("49.9")));
    assert!(partial.currency.is_none());
}

#[test]
fn apollo_cache_follows_pointers() {
    let (partial, issues) = run(
        r#"<script>window.__APOLLO_STATE__ = {
            "Product:tenis-runner": {
                "productName": "Tênis Runner",
                "brand": {"type": "id", "id": "Brand:7", "generated": false},
                "priceRange": {"__ref": "PriceRange:1"}
            },
            "Brand:7": {"name": "Olympikus"},
            "PriceRange:1": {"sellingPrice": {"lowPrice": 149.9}, "listPrice": {"lowPrice": 199.9}}
        };</script>"#,
    );
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    assert_eq!(partial.name.as_deref(), Some("Tênis Runner"));
    assert_eq!(partial.brand.as_deref(), Some("Olympikus"));
    let quote = partial.quote.unwrap();
    assert_eq!(quote.list_price, Some(dec("199.9")));
    assert_eq!(quote.selling_price, Some(dec("149.9")));
}

#[test]
fn vtex_state_template_with_nested_pointers() {
    let (partial, _) = run(
        r#"<template data-type="json" data-varname="__STATE__"><script>{
            "Product:camisa": {
                "productName": "Camisa Linho",
                "brand": "Reserva",
                "priceRange": {"type": "id", "id": "$Product:camisa.priceRange"}
            },
            "$Product:camisa.priceRange": {
                "sellingPrice": {"type": "id", "id": "$Product:camisa.priceRange.sellingPrice"},
                "listPrice": {"type": "id", "id": "$Product:camisa.priceRange.listPrice"}
            },
            "$Product:camisa.priceRange.sellingPrice": {"highPrice": 159.9, "lowPrice": 129.9},
            "$Product:camisa.priceRange.listPrice": {"highPrice": 199.9, "lowPrice": 199.9}
        }</script></template>"#,
    );
    assert_eq!(partial.name.as_deref(), Some("Camisa Linho"));
    assert_eq!(partial.brand.as_deref(), Some("Reserva"));
    let quote = partial.quote.unwrap();
    assert_eq!(quote.selling_price, Some(dec("129.9")));
    assert_eq!(quote.list_price, Some(dec("199.9")));
}

#[test]
fn cyclic_reference_leaves_field_empty() {
    let (partial, issues) = run(
        r#"<script>window.__APOLLO_STATE__ = {
            "Product:x": {"productName": "Bolsa", "brand": {"type": "id", "id": "A"}},
            "A": {"type": "id", "id": "B"},
            "B": {"type": "id", "id": "A"}
        };</script>"#,
    );
    assert_eq!(partial.name.as_deref(), Some("Bolsa"));
    assert!(partial.brand.is_none());
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        &issues[0],
        ExtractionIssue::UnresolvableReference { key, .. } if key == "A"
    ));
}

#[test]
fn unresolvable_field_is_not_filled_by_later_payload() {
    let (partial, issues) = run(
        r#"<script>window.__APOLLO_STATE__ = {
            "Product:x": {"productName": "Bolsa", "brand": {"__ref": "Brand:404"}}
        };</script>
        <script>window.__INITIAL_STATE__ = {"brand": "Outra Marca", "price": 99.9};</script>"#,
    );
    assert_eq!(partial.name.as_deref(), Some("Bolsa"));
    assert!(partial.brand.is_none());
    assert_eq!(partial.quote.unwrap().price, Some(dec("99.9")));
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        &issues[0],
        ExtractionIssue::UnresolvableReference { key, .. } if key == "Brand:404"
    ));
}

#[test]
fn malformed_payload_is_reported_and_next_one_used() {
    let (partial, issues) = run(
        r#"<script id="__NEXT_DATA__">{"props": </script>
        <script>window.__INITIAL_STATE__ = {"productName": "Relógio"};</script>"#,
    );
    assert_eq!(partial.name.as_deref(), Some("Relógio"));
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        &issues[0],
        ExtractionIssue::MalformedHydrationPayload { marker, .. } if marker == "__NEXT_DATA__"
    ));
}

#[test]
fn earlier_payload_wins_per_field() {
    let (partial, _) = run(
        r#"<script>window.__A__ = {"productName": "Primeiro"};</script>
        <script>window.__B__ = {"productName": "Segundo", "brand": "Marca"};</script>"#,
    );
    assert_eq!(partial.name.as_deref(), Some("Primeiro"));
    assert_eq!(partial.brand.as_deref(), Some("Marca"));
}

#[test]
fn keys_match_case_insensitively() {
    let (partial, _) = run(
        r#"<script>window.__STATE__ = {"items":[{"commertialOffer":{"Price": 89.9, "ListPrice": 99.9}}]};</script>"#,
    );
    let quote = partial.quote.unwrap();
    assert_eq!(quote.selling_price, Some(dec("89.9")));
    assert_eq!(quote.list_price, Some(dec("99.9")));
}

#[test]
fn no_payload_yields_empty_partial() {
    let (partial, issues) = run("<html><body><p>R$ 10,00</p></body></html>");
    assert_eq!(partial, PartialRecord::default());
    assert!(issues.is_empty());
}
