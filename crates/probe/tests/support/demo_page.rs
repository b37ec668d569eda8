//! In-memory model of the demo form/table page.

use booker_probe::scenarios::ui::PERCENT_PATTERN;
use booker_probe::{MockDriver, MockElement, Selector};
use serde_json::{json, Value};

pub const APP_URL: &str = "https://demo.test/";

pub const COUNTRIES: [(&str, &str); 10] = [
    ("usa", "United States"),
    ("canada", "Canada"),
    ("uk", "United Kingdom"),
    ("germany", "Germany"),
    ("france", "France"),
    ("australia", "Australia"),
    ("japan", "Japan"),
    ("china", "China"),
    ("brazil", "Brazil"),
    ("india", "India"),
];

pub const ANIMALS: [&str; 10] = [
    "Cat", "Cheetah", "Deer", "Dog", "Elephant", "Fox", "Giraffe", "Lion", "Rabbit", "Zebra",
];

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The page as the scenarios expect it, with a clean axe result.
pub fn demo_page() -> MockDriver {
    demo_page_with_animals(&ANIMALS).on_script("axe.run", axe_result(Vec::new()))
}

/// The page with a different animals list and no axe answer registered.
pub fn demo_page_with_animals(animals: &[&str]) -> MockDriver {
    page_model(animals, &[])
}

/// The page with some weekday checkboxes already ticked.
pub fn demo_page_with_checked(days: &[&str]) -> MockDriver {
    page_model(&ANIMALS, days).on_script("axe.run", axe_result(Vec::new()))
}

fn page_model(animals: &[&str], checked: &[&str]) -> MockDriver {
    let mut page = MockDriver::new()
        .with_element(
            &Selector::css("#name"),
            MockElement::new().attr("maxlength", "15"),
        )
        .with_element(&Selector::css("#male"), MockElement::new())
        .with_element(
            &Selector::css("#country"),
            MockElement::new().options(COUNTRIES),
        )
        .with_elements(
            &Selector::css("#country option"),
            COUNTRIES
                .iter()
                .map(|(_, label)| MockElement::with_text(*label))
                .collect(),
        )
        .with_elements(
            &Selector::css("#animals option"),
            animals
                .iter()
                .map(|animal| MockElement::with_text(format!("\n  {animal}  ")))
                .collect(),
        )
        .with_element(
            &Selector::text("Dynamic Web Table"),
            MockElement::with_text("Dynamic Web Table"),
        )
        .with_element(
            &Selector::text("CPU load of Chrome process:"),
            MockElement::with_text("CPU load of Chrome process:"),
        )
        .with_element(
            &Selector::text_pattern(PERCENT_PATTERN),
            MockElement::with_text("4.2%"),
        )
        .with_element(
            &Selector::role("columnheader", "Network (Mbps)"),
            MockElement::with_text("Network (Mbps)"),
        )
        .on_script("typeof window.axe", json!(true));

    for day in DAYS {
        let checkbox = if checked.contains(&day) {
            MockElement::new().checked()
        } else {
            MockElement::new()
        };
        page = page.with_element(&Selector::label(day), checkbox);
    }
    for browser in ["Internet Explorer", "Chrome", "Firefox"] {
        page = page.with_element(&Selector::role("cell", browser), MockElement::with_text(browser));
    }
    page
}

/// axe-core output with the given violations.
pub fn axe_result(violations: Vec<Value>) -> Value {
    json!({
        "testEngine": { "name": "axe-core", "version": "4.10.0" },
        "violations": violations,
        "passes": [{ "id": "document-title", "impact": null, "nodes": [] }],
        "incomplete": []
    })
}

pub fn violation(id: &str, impact: &str) -> Value {
    json!({
        "id": id,
        "impact": impact,
        "description": format!("{id} description"),
        "help": format!("{id} help"),
        "helpUrl": format!("https://dequeuniversity.com/rules/axe/4.10/{id}"),
        "tags": ["wcag2aa"],
        "nodes": [{ "html": "<a>", "target": ["a"], "failureSummary": "Fix it" }]
    })
}
