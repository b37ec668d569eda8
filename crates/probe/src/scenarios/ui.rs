//! Demo page scenarios.
//!
//! Every scenario opens the form page first and softly checks that it
//! landed on the configured `app_url`.

use super::{Scenario, ScenarioEnv, Suite};
use crate::accessibility::ScanOptions;
use crate::assertion::{ensure, ensure_eq};
use crate::locator::Selector;
use crate::page_object::{sorted_copy, FormPage};
use crate::result::ProbeResult;

const FORM_GROUP: &str = "form_page";
const TABLE_GROUP: &str = "dynamic_web_table";
const PARALLEL_GROUP: &str = "parallel_tests";

/// Weekday checkboxes after Sunday, in page order
pub const WEEKDAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Matches a percentage such as `3.2%` in the CPU column
pub const PERCENT_PATTERN: &str = r"\d+\.?\d*%";

/// The UI scenarios in catalogue order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    let mut all = vec![
        Scenario::new(Suite::Ui, FORM_GROUP, "Verify Blogspot page URL", |env| {
            Box::pin(page_url_and_name(env))
        })
        .tagged(&["ui", "regression"]),
        Scenario::new(
            Suite::Ui,
            FORM_GROUP,
            "Verify Checkbox and Radio Buttons in Blogspot page URL",
            |env| Box::pin(radio_and_checkboxes(env)),
        )
        .tagged(&["ui", "regression"]),
        Scenario::new(
            Suite::Ui,
            FORM_GROUP,
            "Verify static dropdown selection",
            |env| Box::pin(static_dropdown(env)),
        )
        .tagged(&["ui", "regression"]),
        Scenario::new(
            Suite::Ui,
            FORM_GROUP,
            "Verify multi-select dropdown has no duplicates",
            |env| Box::pin(dropdown_duplicates(env)),
        )
        .tagged(&["ui", "regression"]),
        Scenario::new(
            Suite::Ui,
            FORM_GROUP,
            "Verify multi-select dropdown options are sorted",
            |env| Box::pin(dropdown_sorted(env)),
        )
        .tagged(&["ui", "regression"]),
        Scenario::new(
            Suite::Ui,
            TABLE_GROUP,
            "Dynamic Web Table Functionality Test",
            |env| Box::pin(table_functionality(env)),
        )
        .tagged(&["ui"]),
        Scenario::new(
            Suite::Ui,
            TABLE_GROUP,
            "Dynamic Web Table Error Handling Test",
            |env| Box::pin(table_error_handling(env)),
        )
        .tagged(&["ui"]),
        Scenario::new(Suite::Ui, "seed", "seed", |env| Box::pin(seed(env))).tagged(&["ui", "seed"]),
        Scenario::new(
            Suite::Ui,
            "accessibility",
            "Verify Blogspot page accessibility",
            |env| Box::pin(accessibility_scan(env)),
        )
        .tagged(&["ui", "a11y"]),
    ];

    for n in 1..=5 {
        let name = format!("Verify Test{n}");
        all.push(
            Scenario::new(Suite::Ui, PARALLEL_GROUP, &name, move |env| {
                Box::pin(parallel_member(env, n))
            })
            .tagged(&["ui", "parallel"])
            .parallel(),
        );
    }
    all
}

async fn open_form(env: &mut ScenarioEnv) -> ProbeResult<FormPage> {
    let mut form = env.form_page()?;
    let landed = form.open().await?;
    env.soft
        .assert_eq(landed.as_str(), env.config.app_url.as_str(), "form page URL");
    Ok(form)
}

async fn page_url_and_name(mut env: ScenarioEnv) -> ProbeResult<()> {
    let mut form = open_form(&mut env).await?;
    let url = env.config.app_url.clone();
    let landed = form.navigate(&url).await?;
    env.soft.assert_eq(landed.as_str(), url.as_str(), "page URL");

    let driver = form.driver().clone();
    env.soft.assert_true(
        driver.is_visible(&form.name_text_box).await?,
        "name text box visible",
    );
    env.soft.assert_true(
        driver.is_enabled(&form.name_text_box).await?,
        "name text box enabled",
    );
    let max = form.name_max_length().await?;
    env.soft
        .assert_eq(&max.as_deref(), &Some("15"), "name text box maxlength");

    form.fill_name("TestUser12345").await?;
    let value = form.name_value().await?;
    env.soft
        .assert_eq(value.as_str(), "TestUser12345", "name text box value");
    env.finish()
}

async fn radio_and_checkboxes(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let driver = form.driver().clone();

    let radio = form.male_radio.clone();
    env.soft
        .assert_true(driver.is_visible(&radio).await?, "male radio visible");
    env.soft
        .assert_true(driver.is_enabled(&radio).await?, "male radio enabled");
    env.soft
        .assert_false(driver.is_checked(&radio).await?, "male radio initially unchecked");
    form.select_male_radio().await?;
    env.soft
        .assert_true(driver.is_checked(&radio).await?, "male radio checked");

    let sunday = form.sunday_checkbox.clone();
    env.soft
        .assert_true(driver.is_visible(&sunday).await?, "Sunday visible");
    env.soft
        .assert_true(driver.is_enabled(&sunday).await?, "Sunday enabled");
    env.soft
        .assert_false(driver.is_checked(&sunday).await?, "Sunday initially unchecked");
    driver.check(&sunday).await?;
    env.soft
        .assert_true(driver.is_checked(&sunday).await?, "Sunday checked");

    let boxes: Vec<Selector> = WEEKDAYS.iter().map(|day| form.checkbox(day)).collect();
    ensure_eq(&boxes.len(), &6, "weekday checkbox count")?;
    for (day, checkbox) in WEEKDAYS.iter().zip(&boxes) {
        env.soft
            .assert_true(driver.is_visible(checkbox).await?, &format!("{day} visible"));
        env.soft
            .assert_true(driver.is_enabled(checkbox).await?, &format!("{day} enabled"));
        env.soft.assert_false(
            driver.is_checked(checkbox).await?,
            &format!("{day} initially unchecked"),
        );
        form.select_checkbox(day).await?;
        env.soft
            .assert_true(driver.is_checked(checkbox).await?, &format!("{day} checked"));
    }
    for (day, checkbox) in WEEKDAYS.iter().zip(&boxes) {
        env.soft.assert_true(
            driver.is_checked(checkbox).await?,
            &format!("{day} still checked"),
        );
    }

    for (day, checkbox) in WEEKDAYS.iter().zip(&boxes).skip(3) {
        driver.uncheck(checkbox).await?;
        env.soft
            .assert_false(driver.is_checked(checkbox).await?, &format!("{day} unchecked"));
    }
    env.finish()
}

async fn static_dropdown(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let count = form.country_option_count().await?;
    env.soft.assert_eq(&count, &10, "country option count");

    form.select_country("india").await?;
    ensure_eq(
        form.country_value().await?.as_str(),
        "india",
        "selected country",
    )?;
    env.finish()
}

async fn dropdown_duplicates(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let count = form.animal_option_count().await?;
    env.soft.assert_eq(&count, &10, "animal option count");

    let info = form.animal_values_info().await?;
    tracing::info!(
        original = ?info.original,
        unique = ?info.unique,
        duplicates = ?info.duplicates,
        "animal dropdown values"
    );
    ensure(
        info.duplicates.is_empty(),
        &format!("duplicate animal options: {:?}", info.duplicates),
    )?;
    env.finish()
}

async fn dropdown_sorted(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let count = form.animal_option_count().await?;
    env.soft.assert_eq(&count, &10, "animal option count");

    let values = form.animal_values().await?;
    tracing::info!(original = ?values.original, sorted = ?values.sorted, "animal dropdown values");
    env.soft.assert_eq(
        &values.sorted,
        &sorted_copy(&values.original),
        "animal options sorted",
    );
    env.finish()
}

async fn table_functionality(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let driver = form.driver().clone();

    for (selector, what) in [
        (Selector::text("Dynamic Web Table"), "table heading"),
        (Selector::role("cell", "Internet Explorer"), "Internet Explorer row"),
        (Selector::role("cell", "Chrome"), "Chrome row"),
    ] {
        ensure(driver.is_visible(&selector).await?, &format!("{what} visible"))?;
    }

    driver
        .click(&Selector::role("columnheader", "Network (Mbps)"))
        .await?;
    ensure(
        driver.is_visible(&Selector::role("cell", "Firefox")).await?,
        "Firefox row visible after sorting",
    )?;
    env.finish()
}

async fn table_error_handling(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let driver = form.driver().clone();

    let url = driver.url().await?;
    ensure_eq(url.as_str(), env.config.app_url.as_str(), "table page URL")?;

    for (selector, what) in [
        (Selector::text("Dynamic Web Table"), "table heading"),
        (Selector::text("CPU load of Chrome process:"), "CPU load label"),
        (Selector::role("cell", "Chrome"), "Chrome row"),
        (Selector::text_pattern(PERCENT_PATTERN), "CPU percentage"),
    ] {
        ensure(driver.is_visible(&selector).await?, &format!("{what} visible"))?;
    }
    env.finish()
}

async fn seed(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    tracing::info!(url = ?form.visited_url(), "seed page ready");
    env.finish()
}

async fn accessibility_scan(mut env: ScenarioEnv) -> ProbeResult<()> {
    let form = open_form(&mut env).await?;
    let result = env
        .scanner
        .scan(form.driver().as_ref(), &env.test_info, &ScanOptions::default())
        .await?;
    let failing = result.failing_rule_ids();
    env.soft
        .assert_empty(&failing, "critical or serious accessibility violations");
    env.finish()
}

async fn parallel_member(mut env: ScenarioEnv, n: u32) -> ProbeResult<()> {
    open_form(&mut env).await?;
    tracing::info!("This is Test {n}");
    env.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scenarios::GroupMode;

    #[test]
    fn test_ui_catalogue() {
        let all = scenarios();
        assert!(all.iter().all(|s| s.suite == Suite::Ui && s.has_tag("ui")));
        assert!(all.iter().any(|s| s.has_tag("a11y")));
        let parallel: Vec<&str> = all
            .iter()
            .filter(|s| s.mode == GroupMode::Parallel)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            parallel,
            ["Verify Test1", "Verify Test2", "Verify Test3", "Verify Test4", "Verify Test5"]
        );
    }

    fn body_is_send<F>(_: impl Fn(ScenarioEnv) -> F)
    where
        F: std::future::Future<Output = ProbeResult<()>> + Send,
    {
    }

    #[test]
    fn test_bodies_are_send() {
        body_is_send(page_url_and_name);
        body_is_send(radio_and_checkboxes);
        body_is_send(static_dropdown);
        body_is_send(dropdown_duplicates);
        body_is_send(dropdown_sorted);
        body_is_send(table_functionality);
        body_is_send(table_error_handling);
        body_is_send(seed);
        body_is_send(accessibility_scan);
        body_is_send(|env| parallel_member(env, 1));
    }

    #[test]
    fn test_percent_pattern() {
        let re = regex::Regex::new(PERCENT_PATTERN).unwrap();
        assert!(re.is_match("3.5%"));
        assert!(re.is_match("12%"));
        assert!(!re.is_match("Chrome"));
    }
}
