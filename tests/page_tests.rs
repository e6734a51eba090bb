use std::time::{Duration, Instant};

use discover_e2e::browser::protocol::{ElementState, Locator, WaitUntil};
use discover_e2e::error::SuiteError;
use discover_e2e::logger::diagnostic::DiagnosticLogger;
use discover_e2e::page::home::{ContentType, HomePage, Lookup};
use discover_e2e::page::selectors::{HOME_SELECTORS, Selectors, xpath_literal};
use discover_e2e::page::stabilize::{
    ContentStabilizer, Stabilization, StabilizerConfig, content_fingerprint,
};
use discover_e2e::report::attachment::ReportContext;
use tempfile::TempDir;

mod common;
use common::fake_driver::{Call, FakeDriver};
use common::read_log;

const BASE: &str = "https://discover.test";
const S: &Selectors = &HOME_SELECTORS;

fn logger() -> (TempDir, DiagnosticLogger) {
    let dir = tempfile::tempdir().unwrap();
    let logger = DiagnosticLogger::new(dir.path().join("logs"));
    (dir, logger)
}

// =========================================================================
// Locators
// =========================================================================

#[test]
fn xpath_literal_picks_a_safe_quote() {
    assert_eq!(xpath_literal("Predator"), "'Predator'");
    assert_eq!(xpath_literal("Schindler's List"), "\"Schindler's List\"");
    assert_eq!(
        xpath_literal(r#"It's "fine""#),
        r#"concat('It', "'", 's "fine"')"#
    );
}

#[test]
fn content_title_matches_normalized_text_and_takes_first() {
    let locator = S.content_title("The Godfather");
    assert_eq!(locator.nth, Some(0));
    assert_eq!(
        locator.to_string(),
        "xpath=//p[normalize-space()='The Godfather'] >> nth=0"
    );
}

#[test]
fn rating_star_is_scoped_inside_the_nth_list_item() {
    let star = S.rating_star(2);
    let parent = star.parent.as_deref().unwrap();
    assert_eq!(parent, &Locator::css("ul.rc-rate li").nth(2));
}

#[test]
fn content_type_parse_is_case_insensitive() {
    assert_eq!(ContentType::parse("Movies"), Some(ContentType::Movie));
    assert_eq!(ContentType::parse("MOVIE"), Some(ContentType::Movie));
    assert_eq!(ContentType::parse("TV Shows"), Some(ContentType::Tv));
    assert_eq!(ContentType::parse("Documentary"), None);
}

// =========================================================================
// Navigation
// =========================================================================

#[test]
fn navigate_waits_for_network_idle() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE).navigate().unwrap();

    assert_eq!(
        driver.calls[0],
        Call::Navigate(BASE.to_string(), WaitUntil::NetworkIdle)
    );
}

#[test]
fn navigate_logs_then_propagates_navigation_failure() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().failing_navigation();

    let err = HomePage::new(&mut driver, &logger, BASE)
        .navigate()
        .unwrap_err();

    assert!(matches!(err, SuiteError::NavigationFailure { .. }));
    assert!(read_log(&logger).contains("Failed to navigate to https://discover.test"));
}

#[test]
fn open_path_joins_base_url_and_waits_for_load() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, "https://discover.test/")
        .open_path("/popular")
        .unwrap();

    assert_eq!(
        driver.calls[0],
        Call::Navigate("https://discover.test/popular".into(), WaitUntil::Load)
    );
}

// =========================================================================
// Category
// =========================================================================

#[test]
fn select_category_clicks_link_then_stabilizes() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE)
        .select_category("Popular")
        .unwrap();

    assert!(driver.clicked(&S.category_link("Popular")));
    assert!(!driver.clicked(&S.category_role("Popular")));
    assert!(
        driver
            .calls
            .contains(&Call::WaitFor(S.loading_spinner(), ElementState::Hidden))
    );
    assert!(driver.calls.contains(&Call::AllText(S.card_titles())));
    assert!(read_log(&logger).is_empty());
}

#[test]
fn select_category_falls_back_to_role_without_raising() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.category_link("Trend"));

    let result = HomePage::new(&mut driver, &logger, BASE).select_category("Trend");

    assert!(result.is_ok());
    assert!(driver.clicked(&S.category_role("Trend")));
    assert!(read_log(&logger).contains("User: Failed to select category Trend"));
}

#[test]
fn select_category_surfaces_fallback_failure() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .timeout_on(S.category_link("Newest"))
        .timeout_on(S.category_role("Newest"));

    let err = HomePage::new(&mut driver, &logger, BASE)
        .select_category("Newest")
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("role=button"));
}

// =========================================================================
// Search
// =========================================================================

#[test]
fn search_fills_and_submits_with_enter() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE).search_by_title("Predator");

    assert!(
        driver
            .calls
            .contains(&Call::Fill(S.search_field(), "Predator".into()))
    );
    assert!(
        driver
            .calls
            .contains(&Call::Press(S.search_field(), "Enter".into()))
    );
}

#[test]
fn search_failure_is_logged_not_raised() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.search_field());

    HomePage::new(&mut driver, &logger, BASE).search_by_title("Predator");

    assert!(read_log(&logger).contains("User: Search failed for Predator"));
    assert!(!driver.calls.iter().any(|c| matches!(c, Call::Press(..))));
}

// =========================================================================
// Type
// =========================================================================

#[test]
fn select_type_opens_dropdown_when_menu_hidden() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE)
        .select_type("Movies")
        .unwrap();

    assert!(driver.clicked(&S.type_value()));
    assert!(driver.clicked(&S.movie_option()));
}

#[test]
fn select_type_does_not_reopen_a_visible_menu() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().visible(S.type_menu());

    HomePage::new(&mut driver, &logger, BASE)
        .select_type("TV Shows")
        .unwrap();

    assert!(!driver.clicked(&S.type_value()));
    assert!(driver.clicked(&S.tv_option()));
}

#[test]
fn select_type_falls_back_to_option_text() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().visible(S.type_menu());

    HomePage::new(&mut driver, &logger, BASE)
        .select_type("Documentary")
        .unwrap();

    assert!(driver.clicked(&S.type_option("Documentary")));
}

#[test]
fn select_type_failure_is_logged_and_raised() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.movie_option());

    let err = HomePage::new(&mut driver, &logger, BASE)
        .select_type("Movie")
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(read_log(&logger).contains("User: Type selection failed: Movie"));
}

// =========================================================================
// Year range
// =========================================================================

#[test]
fn select_year_range_fills_and_confirms_both_inputs() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE)
        .select_year_range(2020, 2024)
        .unwrap();

    let expected = [
        Call::Fill(S.year_start(), "2020".into()),
        Call::Press(S.year_start(), "Enter".into()),
        Call::Fill(S.year_end(), "2024".into()),
        Call::Press(S.year_end(), "Enter".into()),
    ];
    assert_eq!(&driver.calls[..4], &expected);
}

#[test]
fn select_year_range_propagates_without_logging() {
    let (dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.year_end());

    let err = HomePage::new(&mut driver, &logger, BASE)
        .select_year_range(2020, 2024)
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(!common::log_exists(&dir.path().join("logs")));
    assert!(!driver.calls.iter().any(|c| matches!(c, Call::Screenshot(_))));
}

// =========================================================================
// Rating
// =========================================================================

#[test]
fn select_rating_maps_one_based_rating_to_star_index() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE)
        .select_rating(3)
        .unwrap();

    assert_eq!(driver.calls[0], Call::Hover(S.rating_star(2)));
    assert_eq!(driver.calls[1], Call::Click(S.rating_star(2)));
}

#[test]
fn select_rating_rejects_out_of_range_values() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    for rating in [0, 6] {
        let err = HomePage::new(&mut driver, &logger, BASE)
            .select_rating(rating)
            .unwrap_err();
        assert!(matches!(err, SuiteError::InvalidArgument(_)));
    }
    assert!(driver.calls.is_empty());
}

#[test]
fn select_rating_failure_is_raised() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.rating_star(4));

    let result = HomePage::new(&mut driver, &logger, BASE).select_rating(5);

    assert!(result.is_err());
    assert!(read_log(&logger).contains("Star rating selection failed: 5"));
}

// =========================================================================
// Genres
// =========================================================================

#[test]
fn select_genres_reopens_dropdown_for_each_genre() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE).select_genres(&["Action", "Comedy"]);

    assert_eq!(driver.click_count(&S.genre_control()), 2);
    assert!(driver.clicked(&S.genre_option("Action")));
    assert!(driver.clicked(&S.genre_option("Comedy")));
    let genre_pauses = driver
        .pauses()
        .into_iter()
        .filter(|d| *d == Duration::from_millis(500))
        .count();
    assert!(genre_pauses >= 2);

    // Comedy is only looked up after Action was clicked
    let action = driver
        .calls
        .iter()
        .position(|c| *c == Call::Click(S.genre_option("Action")))
        .unwrap();
    let comedy = driver
        .calls
        .iter()
        .position(|c| *c == Call::WaitFor(S.genre_option("Comedy"), ElementState::Visible))
        .unwrap();
    assert!(action < comedy);
}

#[test]
fn select_genres_failure_is_logged_not_raised() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.genre_option("Western"));

    HomePage::new(&mut driver, &logger, BASE).select_genres(&["Western"]);

    assert!(read_log(&logger).contains("Genre selection failed for: Western"));
}

// =========================================================================
// Pagination
// =========================================================================

#[test]
fn next_and_previous_swallow_failures() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .timeout_on(S.next_page())
        .timeout_on(S.previous_page());

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    page.click_next_page();
    page.click_previous_page();
    drop(page);

    let log = read_log(&logger);
    assert!(log.contains("Next page click failed"));
    assert!(log.contains("Previous page click failed"));
}

#[test]
fn go_to_page_clicks_and_pauses_without_verifying() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new();

    HomePage::new(&mut driver, &logger, BASE)
        .go_to_page(2)
        .unwrap();

    assert!(driver.clicked(&S.page_link(2)));
    assert!(driver.pauses().contains(&Duration::from_secs(1)));
    assert!(
        !driver
            .calls
            .iter()
            .any(|c| matches!(c, Call::WaitFor(l, _) if *l == S.active_page(2)))
    );
}

#[test]
fn go_to_page_and_verify_raise_on_failure() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .timeout_on(S.page_link(53643))
        .timeout_on(S.active_page(2));

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    assert!(page.go_to_page(53643).is_err());
    assert!(page.verify_active_page(2).is_err());
    drop(page);

    let log = read_log(&logger);
    assert!(log.contains("Page click failed for Page 53643"));
    assert!(log.contains("Failed to verify Page 2 active state"));
}

#[test]
fn next_then_previous_restores_the_first_page_titles() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .with_texts(S.card_titles(), &["Dune", "Sinners"])
        .texts_on_click(S.next_page(), S.card_titles(), &["Weapons", "Heat"])
        .texts_on_click(S.previous_page(), S.card_titles(), &["Dune", "Sinners"]);

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    let first = page.get_all_card_titles();
    page.click_next_page();
    let next = page.get_all_card_titles();
    page.click_previous_page();
    let previous = page.get_all_card_titles();

    assert_ne!(next, first);
    assert_eq!(previous, first);
}

#[test]
fn switching_type_changes_the_grid_titles() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .texts_on_click(S.tv_option(), S.card_titles(), &["The Rookie"])
        .texts_on_click(S.movie_option(), S.card_titles(), &["Baramulla"]);

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    page.select_type("TV Shows").unwrap();
    let tv = page.get_all_card_titles();
    page.select_type("Movies").unwrap();
    let movies = page.get_all_card_titles();

    assert_eq!(tv, vec!["The Rookie"]);
    assert_eq!(movies, vec!["Baramulla"]);
}

// =========================================================================
// Queries
// =========================================================================

#[test]
fn find_content_separates_absence_from_failure() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .timeout_on(S.content_title("Missing"))
        .broken_on(S.content_title("Broken"));

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    assert_eq!(page.find_content("Frankenstein"), Lookup::Found);
    assert_eq!(page.find_content("Missing"), Lookup::NotFound);
    assert!(matches!(page.find_content("Broken"), Lookup::Error(_)));
}

#[test]
fn is_content_displayed_reads_false_on_absence_and_on_error() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .timeout_on(S.content_title("Missing"))
        .broken_on(S.content_title("Broken"));

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    assert!(page.is_content_displayed("Frankenstein"));
    assert!(!page.is_content_displayed("Missing"));
    assert!(!page.is_content_displayed("Broken"));
    drop(page);

    let log = read_log(&logger);
    assert!(log.contains("Content visibility check failed"));
    assert_eq!(log.matches("User: ").count(), 1);
}

#[test]
fn card_count_returns_count_and_raises_on_error() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new().with_count(S.cards(), 20);
    assert_eq!(
        HomePage::new(&mut driver, &logger, BASE)
            .get_content_card_count()
            .unwrap(),
        20
    );

    let mut broken = FakeDriver::new().broken_on(S.cards());
    assert!(
        HomePage::new(&mut broken, &logger, BASE)
            .get_content_card_count()
            .is_err()
    );
    assert!(read_log(&logger).contains("Card count failed"));
}

#[test]
fn card_titles_are_empty_on_failure_and_only_reach_the_console() {
    let (dir, logger) = logger();
    let mut driver = FakeDriver::new().timeout_on(S.card_titles().first());

    let titles = HomePage::new(&mut driver, &logger, BASE).get_all_card_titles();

    assert!(titles.is_empty());
    assert!(!common::log_exists(&dir.path().join("logs")));
}

#[test]
fn card_titles_come_back_in_grid_order() {
    let (_dir, logger) = logger();
    let mut driver =
        FakeDriver::new().with_texts(S.card_titles(), &["Predator", "Predator: Badlands"]);

    let titles = HomePage::new(&mut driver, &logger, BASE).get_all_card_titles();

    assert_eq!(titles, vec!["Predator", "Predator: Badlands"]);
}

// =========================================================================
// Failure artifacts
// =========================================================================

#[test]
fn failures_attach_log_and_screenshot_to_active_report() {
    let (_dir, logger) = logger();
    let report = ReportContext::new();
    let mut driver = FakeDriver::new().timeout_on(S.search_field());

    HomePage::new(&mut driver, &logger, BASE)
        .with_report(&report)
        .search_by_title("Predator");

    let attachments = report.take();
    let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Search failed for Predator - Error Log",
            "Search failed for Predator - Screenshot"
        ]
    );
    assert!(driver.calls.contains(&Call::Screenshot(true)));
}

#[test]
fn closed_page_gets_no_screenshot() {
    let (_dir, logger) = logger();
    let report = ReportContext::new();
    let mut driver = FakeDriver::new()
        .already_closed()
        .timeout_on(S.search_field());

    HomePage::new(&mut driver, &logger, BASE)
        .with_report(&report)
        .search_by_title("Predator");

    assert_eq!(report.len(), 1);
    assert!(!driver.calls.iter().any(|c| matches!(c, Call::Screenshot(_))));
}

// =========================================================================
// Content stabilization
// =========================================================================

fn stabilizer(config: StabilizerConfig) -> ContentStabilizer {
    ContentStabilizer::new(S.loading_spinner(), S.card_titles(), config)
}

#[test]
fn stable_content_is_sampled_only_after_the_settle_delay() {
    let mut driver = FakeDriver::new().with_texts(S.card_titles(), &["A", "B"]);

    let outcome = stabilizer(StabilizerConfig::default()).wait(&mut driver);

    match outcome {
        Stabilization::Stable { fingerprint, polls } => {
            assert_eq!(polls, 1);
            assert_eq!(
                fingerprint,
                content_fingerprint(&["A".to_string(), "B".to_string()])
            );
        }
        other => panic!("expected Stable, got {:?}", other),
    }
    assert_eq!(
        driver.pauses(),
        vec![Duration::from_millis(500), Duration::from_millis(250)]
    );
    let settle = driver
        .calls
        .iter()
        .position(|c| *c == Call::Pause(Duration::from_millis(500)))
        .unwrap();
    let first_read = driver
        .calls
        .iter()
        .position(|c| *c == Call::AllText(S.card_titles()))
        .unwrap();
    assert!(settle < first_read);
}

#[test]
fn grid_that_rerenders_late_is_not_reported_with_old_content() {
    let mut driver = FakeDriver::new()
        .with_texts(S.card_titles(), &["Old One", "Old Two"])
        .texts_after(S.card_titles(), Duration::from_millis(400), &["New One", "New Two"])
        .real_pauses();
    let started = Instant::now();

    let outcome = stabilizer(StabilizerConfig::default()).wait(&mut driver);

    assert!(started.elapsed() >= Duration::from_millis(500));
    match outcome {
        Stabilization::Stable { fingerprint, .. } => assert_eq!(
            fingerprint,
            content_fingerprint(&["New One".to_string(), "New Two".to_string()])
        ),
        other => panic!("expected Stable, got {:?}", other),
    }
}

#[test]
fn select_type_returns_the_grid_that_rendered_after_the_click() {
    let (_dir, logger) = logger();
    let mut driver = FakeDriver::new()
        .with_texts(S.card_titles(), &["Baramulla"])
        .texts_after(S.card_titles(), Duration::from_millis(400), &["The Rookie"])
        .real_pauses();

    let mut page = HomePage::new(&mut driver, &logger, BASE);
    page.select_type("TV Shows").unwrap();

    assert_eq!(page.get_all_card_titles(), vec!["The Rookie"]);
}

#[test]
fn missing_spinner_does_not_block_stabilization() {
    let mut driver = FakeDriver::new().timeout_on(S.loading_spinner());

    let outcome = stabilizer(StabilizerConfig::default()).wait(&mut driver);

    assert!(matches!(outcome, Stabilization::Stable { .. }));
}

#[test]
fn unreadable_content_falls_back_to_fixed_delay() {
    let mut driver = FakeDriver::new().broken_on(S.card_titles());

    let outcome = stabilizer(StabilizerConfig::default()).wait(&mut driver);

    assert_eq!(outcome, Stabilization::FixedDelay);
    assert_eq!(driver.pauses(), vec![Duration::from_millis(500)]);
}

#[test]
fn changing_content_is_unsettled_after_window() {
    let mut driver = FakeDriver::new().changing_text().real_pauses();
    let config = StabilizerConfig {
        poll_interval: Duration::from_millis(5),
        window: Duration::from_millis(40),
        settle_delay: Duration::from_millis(5),
        ..StabilizerConfig::default()
    };

    let outcome = stabilizer(config).wait(&mut driver);

    match outcome {
        Stabilization::Unsettled { polls } => assert!(polls >= 1),
        other => panic!("expected Unsettled, got {:?}", other),
    }
}

#[test]
fn fingerprint_distinguishes_order_and_emptiness() {
    let ab = content_fingerprint(&["A".into(), "B".into()]);
    let ba = content_fingerprint(&["B".into(), "A".into()]);
    let empty = content_fingerprint(&[]);
    let blank = content_fingerprint(&["".into()]);

    assert_ne!(ab, ba);
    assert_ne!(empty, blank);
    assert_eq!(ab.len(), 40);
}
