use std::fmt;

use tracing::{debug, info};

use crate::browser::driver::Driver;
use crate::browser::protocol::{ElementState, Locator, WaitUntil};
use crate::error::{SuiteError, SuiteResult};
use crate::logger::diagnostic::DiagnosticLogger;
use crate::page::selectors::{HOME_SELECTORS, Selectors, Timings};
use crate::page::stabilize::{ContentStabilizer, Stabilization, StabilizerConfig};
use crate::report::attachment::ReportContext;

/// Outcome of a read-only element query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
    /// The check itself failed, distinct from a clean miss
    Error(String),
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found)
    }
}

/// Content type offered by the type dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Movie,
    Tv,
}

impl ContentType {
    /// Case-insensitive match against "movie" / "tv"; anything else is a
    /// free-text option label.
    pub fn parse(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        if lower.contains("movie") {
            Some(ContentType::Movie)
        } else if lower.contains("tv") {
            Some(ContentType::Tv)
        } else {
            None
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Movie => write!(f, "Movie"),
            ContentType::Tv => write!(f, "TV Shows"),
        }
    }
}

// ============================================================================
// HomePage — page object for the discover home page
// ============================================================================

/// Named actions over the home page of the discover catalog.
///
/// Mutating actions follow one cycle: resolve the target within a bounded
/// wait, interact, then run the content-stabilization wait. Whether a
/// failure is swallowed or re-raised is decided per action.
pub struct HomePage<'a> {
    driver: &'a mut dyn Driver,
    logger: &'a DiagnosticLogger,
    report: Option<&'a ReportContext>,
    base_url: String,
    selectors: &'static Selectors,
    timings: Timings,
    stabilizer: ContentStabilizer,
}

impl<'a> HomePage<'a> {
    pub fn new(
        driver: &'a mut dyn Driver,
        logger: &'a DiagnosticLogger,
        base_url: impl Into<String>,
    ) -> Self {
        let selectors = &HOME_SELECTORS;
        Self {
            driver,
            logger,
            report: None,
            base_url: base_url.into(),
            selectors,
            timings: Timings::default(),
            stabilizer: ContentStabilizer::new(
                selectors.loading_spinner(),
                selectors.card_titles(),
                StabilizerConfig::default(),
            ),
        }
    }

    /// Attach failure artifacts to `report` while it is active.
    pub fn with_report(mut self, report: &'a ReportContext) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_stabilizer(mut self, config: StabilizerConfig) -> Self {
        self.stabilizer = ContentStabilizer::new(
            self.selectors.loading_spinner(),
            self.selectors.card_titles(),
            config,
        );
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn selectors(&self) -> &'static Selectors {
        self.selectors
    }

    /// Raw session access for steps with no page-level action.
    pub fn driver(&mut self) -> &mut dyn Driver {
        &mut *self.driver
    }

    /// Uniform failure path: log record plus screenshot when possible.
    fn report_failure(&mut self, context: &str, err: &SuiteError) {
        self.logger
            .log_error_with_page(context, err, &mut *self.driver, self.report);
    }

    /// Wait for loading to finish and content to settle.
    pub fn wait_for_content_load(&mut self) -> Stabilization {
        let outcome = self.stabilizer.wait(&mut *self.driver);
        debug!(?outcome, "content stabilization");
        outcome
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Open the home page and wait for the network to go idle.
    pub fn navigate(&mut self) -> SuiteResult<()> {
        let url = self.base_url.clone();
        self.open_url(&url, WaitUntil::NetworkIdle)
    }

    /// Open a path below the base URL directly, e.g. `/popular`.
    pub fn open_path(&mut self, path: &str) -> SuiteResult<()> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.open_url(&url, WaitUntil::Load)
    }

    fn open_url(&mut self, url: &str, wait_until: WaitUntil) -> SuiteResult<()> {
        match self.driver.navigate(url, wait_until) {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = match err {
                    nav @ SuiteError::NavigationFailure { .. } => nav,
                    other => SuiteError::NavigationFailure {
                        url: url.to_string(),
                        reason: other.to_string(),
                    },
                };
                self.report_failure(&format!("Failed to navigate to {}", url), &err);
                Err(err)
            }
        }
    }

    /// Wait for the card grid and the load event. Only logs on failure.
    pub fn wait_for_page_load(&mut self) {
        let cards = self.selectors.cards().first();
        if let Err(err) = self
            .driver
            .wait_for(&cards, ElementState::Attached, self.timings.page_load)
        {
            self.report_failure("Page load warning", &err);
        }
    }

    pub fn scroll_to_bottom(&mut self) -> SuiteResult<()> {
        self.driver
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")?;
        Ok(())
    }

    pub fn is_body_visible(&mut self) -> bool {
        let body = self.selectors.body();
        self.driver.is_visible(&body).unwrap_or(false)
    }

    // ------------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------------

    /// Click a category link by its text, falling back to an accessible
    /// button of the same name. The primary failure is logged, not raised;
    /// a failing fallback is returned.
    pub fn select_category(&mut self, category: &str) -> SuiteResult<()> {
        let link = self.selectors.category_link(category);
        match self.driver.click(&link, self.timings.category) {
            Ok(()) => {
                self.wait_for_content_load();
                Ok(())
            }
            Err(err) => {
                self.report_failure(&format!("Failed to select category {}", category), &err);
                let fallback = self.selectors.category_role(category);
                self.driver.click(&fallback, self.timings.action)?;
                self.wait_for_content_load();
                Ok(())
            }
        }
    }

    /// Fill the search box and submit with Enter. Only logs on failure.
    pub fn search_by_title(&mut self, title: &str) {
        let input = self.selectors.search_field();
        let result = self
            .driver
            .fill(&input, title, self.timings.action)
            .and_then(|()| self.driver.press(&input, "Enter", self.timings.action));

        match result {
            Ok(()) => {
                self.wait_for_content_load();
            }
            Err(err) => self.report_failure(&format!("Search failed for {}", title), &err),
        }
    }

    /// Open the type dropdown unless its menu is already showing.
    pub fn open_type_dropdown(&mut self) -> SuiteResult<()> {
        let menu = self.selectors.type_menu();
        if self.driver.is_visible(&menu)? {
            return Ok(());
        }
        let value = self.selectors.type_value();
        self.driver
            .wait_for(&value, ElementState::Visible, self.timings.dropdown)?;
        self.driver.click(&value, self.timings.dropdown)?;
        self.driver
            .wait_for(&menu, ElementState::Visible, self.timings.dropdown)
    }

    /// Choose "Movie", "TV", or any other option label. Failures are logged
    /// and re-raised so a scenario never runs on an unapplied filter.
    pub fn select_type(&mut self, label: &str) -> SuiteResult<()> {
        match self.apply_type(label) {
            Ok(()) => {
                info!("Type filter applied successfully: {}", label);
                Ok(())
            }
            Err(err) => {
                self.report_failure(&format!("Type selection failed: {}", label), &err);
                Err(err)
            }
        }
    }

    fn apply_type(&mut self, label: &str) -> SuiteResult<()> {
        self.open_type_dropdown()?;
        let option = match ContentType::parse(label) {
            Some(ContentType::Movie) => self.selectors.movie_option(),
            Some(ContentType::Tv) => self.selectors.tv_option(),
            None => self.selectors.type_option(label),
        };
        self.driver.click(&option, self.timings.action)?;
        info!("Selected type option: {}", label);
        self.wait_for_content_load();
        Ok(())
    }

    /// Type both years and confirm each with Enter.
    ///
    /// Unlike its sibling filters this has no failure handling: any error
    /// propagates untouched and nothing is logged.
    pub fn select_year_range(&mut self, start_year: u16, end_year: u16) -> SuiteResult<()> {
        let start = self.selectors.year_start();
        let end = self.selectors.year_end();

        self.driver
            .fill(&start, &start_year.to_string(), self.timings.action)?;
        self.driver.press(&start, "Enter", self.timings.action)?;

        self.driver
            .fill(&end, &end_year.to_string(), self.timings.action)?;
        self.driver.press(&end, "Enter", self.timings.action)?;

        self.wait_for_content_load();
        info!("Selected year range: {} - {}", start_year, end_year);
        Ok(())
    }

    /// Hover then click the `rating`-th star (1-based). Re-raises failures.
    pub fn select_rating(&mut self, rating: u8) -> SuiteResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(SuiteError::InvalidArgument(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }

        let star = self.selectors.rating_star(usize::from(rating - 1));
        let result = self
            .driver
            .hover(&star, self.timings.action)
            .and_then(|()| self.driver.click(&star, self.timings.action));

        match result {
            Ok(()) => {
                self.wait_for_content_load();
                info!("Selected star rating: {}", rating);
                Ok(())
            }
            Err(err) => {
                self.report_failure(&format!("Star rating selection failed: {}", rating), &err);
                Err(err)
            }
        }
    }

    /// Pick each genre in turn. The dropdown is reopened for every genre
    /// because each pick can change the remaining options. Only logs on
    /// failure.
    pub fn select_genres<S: AsRef<str>>(&mut self, genres: &[S]) {
        let names: Vec<&str> = genres.iter().map(|g| g.as_ref()).collect();
        match self.apply_genres(&names) {
            Ok(()) => {
                self.wait_for_content_load();
                info!("Selected genres: {}", names.join(", "));
            }
            Err(err) => {
                self.report_failure(
                    &format!("Genre selection failed for: {}", names.join(", ")),
                    &err,
                );
            }
        }
    }

    fn apply_genres(&mut self, genres: &[&str]) -> SuiteResult<()> {
        let control = self.selectors.genre_control();
        let menu = self.selectors.genre_menu();
        for genre in genres {
            self.driver.click(&control, self.timings.action)?;
            self.driver
                .wait_for(&menu, ElementState::Visible, self.timings.action)?;

            let option = self.selectors.genre_option(genre);
            self.driver
                .wait_for(&option, ElementState::Visible, self.timings.action)?;
            self.driver.click(&option, self.timings.action)?;
            info!("Selected genre: {}", genre);

            self.driver.pause(self.timings.genre_pause);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------------

    /// Only logs on failure.
    pub fn click_next_page(&mut self) {
        let next = self.selectors.next_page();
        if let Err(err) = self.click_pagination(&next) {
            self.report_failure("Next page click failed", &err);
        }
    }

    /// Only logs on failure.
    pub fn click_previous_page(&mut self) {
        let previous = self.selectors.previous_page();
        if let Err(err) = self.click_pagination(&previous) {
            self.report_failure("Previous page click failed", &err);
        }
    }

    fn click_pagination(&mut self, control: &Locator) -> SuiteResult<()> {
        self.driver
            .wait_for(control, ElementState::Visible, self.timings.pagination)?;
        self.driver.click(control, self.timings.pagination)?;
        self.wait_for_content_load();
        Ok(())
    }

    /// Click the numbered page control. Does not confirm the page became
    /// active; that is `verify_active_page`. Re-raises failures.
    pub fn go_to_page(&mut self, page: u32) -> SuiteResult<()> {
        let target = self.selectors.page_link(page);
        let result = self
            .driver
            .wait_for(&target, ElementState::Visible, self.timings.go_to_page)
            .and_then(|()| self.driver.click(&target, self.timings.go_to_page));

        match result {
            Ok(()) => {
                info!("Clicked on Page {}", page);
                self.driver.pause(self.timings.go_to_page_pause);
                Ok(())
            }
            Err(err) => {
                self.report_failure(&format!("Page click failed for Page {}", page), &err);
                Err(err)
            }
        }
    }

    /// Assert `page` carries the current-page indicator. Re-raises failures.
    pub fn verify_active_page(&mut self, page: u32) -> SuiteResult<()> {
        let active = self.selectors.active_page(page);
        match self
            .driver
            .wait_for(&active, ElementState::Visible, self.timings.verify_page)
        {
            Ok(()) => {
                self.wait_for_content_load();
                info!("Page {} is active and verified", page);
                Ok(())
            }
            Err(err) => {
                self.report_failure(
                    &format!("Failed to verify Page {} active state", page),
                    &err,
                );
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether a title paragraph with exactly `title` becomes visible.
    pub fn find_content(&mut self, title: &str) -> Lookup {
        let locator = self.selectors.content_title(title);
        match self
            .driver
            .wait_for(&locator, ElementState::Visible, self.timings.visibility)
        {
            Ok(()) => Lookup::Found,
            Err(err) if err.is_timeout() => Lookup::NotFound,
            Err(err) => Lookup::Error(err.to_string()),
        }
    }

    /// `true` only when found. A failing check is logged and reads as
    /// `false`, the same as absence; use `find_content` to tell them apart.
    pub fn is_content_displayed(&mut self, title: &str) -> bool {
        match self.find_content(title) {
            Lookup::Found => true,
            Lookup::NotFound => false,
            Lookup::Error(reason) => {
                let err = SuiteError::SessionProtocol {
                    command: "is_content_displayed".into(),
                    error: reason,
                };
                self.report_failure("Content visibility check failed", &err);
                false
            }
        }
    }

    /// Number of content cards currently in the grid. Re-raises failures.
    pub fn get_content_card_count(&mut self) -> SuiteResult<usize> {
        let cards = self.selectors.cards();
        match self.driver.count(&cards) {
            Ok(count) => Ok(count),
            Err(err) => {
                self.report_failure("Card count failed", &err);
                Err(err)
            }
        }
    }

    /// Titles of every card, or empty when none appear in time.
    pub fn get_all_card_titles(&mut self) -> Vec<String> {
        let titles = self.selectors.card_titles();
        let result = self
            .driver
            .wait_for(&titles.clone().first(), ElementState::Visible, self.timings.titles)
            .and_then(|()| self.driver.all_text(&titles));

        match result {
            Ok(found) => {
                debug!(?found, "card titles");
                found
            }
            Err(err) => {
                self.logger
                    .error(format!("Error while fetching card titles: {}", err));
                Vec::new()
            }
        }
    }
}
