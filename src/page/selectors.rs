use std::time::Duration;

use crate::browser::protocol::Locator;

// ============================================================================
// Selector table — every locator the home page object knows about
// ============================================================================

/// Symbolic locator expressions for the discover home page.
///
/// Scenario code never sees these; it goes through `HomePage` actions.
#[derive(Debug, Clone, Copy)]
pub struct Selectors {
    pub search_input: &'static str,
    pub content_card: &'static str,
    pub card_title: &'static str,

    pub type_dropdown: &'static str,
    pub type_single_value: &'static str,
    pub type_menu: &'static str,
    pub type_option: &'static str,
    pub movie_option: &'static str,
    pub tv_option: &'static str,

    pub year_start_input: &'static str,
    pub year_end_input: &'static str,

    pub rating_star: &'static str,

    pub genre_control: &'static str,
    pub genre_menu: &'static str,
    pub genre_option: &'static str,

    pub next_page: &'static str,
    pub previous_page: &'static str,
    pub pagination_root: &'static str,

    pub loading_spinner: &'static str,
    pub body: &'static str,
}

pub static HOME_SELECTORS: Selectors = Selectors {
    search_input: r#"input[placeholder="SEARCH"], input[placeholder*="Search" i], input[name="search"]"#,
    content_card: ".grid > div.flex.flex-col.items-center",
    card_title: ".grid .flex-col p.text-blue-500",

    type_dropdown: "div.css-2b097c-container",
    type_single_value: "div.css-1uccc91-singleValue",
    type_menu: r#"//*[@id="root"]/div/aside/div/div[1]/div[2]"#,
    type_option: ".css-9gakcf-option, .css-1n7v3ny-option",
    movie_option: r#"//*[@id="react-select-2-option-0"]"#,
    tv_option: r#"//*[@id="react-select-2-option-1"]"#,

    year_start_input: "#react-select-4-input",
    year_end_input: "#react-select-5-input",

    rating_star: "ul.rc-rate li",

    genre_control: "#root > div > aside > div > div:nth-child(4) > div.css-yk16xz-control",
    genre_menu: ".css-26l3qy-menu",
    genre_option: r#"div[id^="react-select-3-option"]"#,

    next_page: r#"#react-paginate li.next a[role="button"][aria-label="Next page"]"#,
    previous_page: r#"#react-paginate li.previous a[role="button"][aria-label="Previous page"]"#,
    pagination_root: "#react-paginate",

    loading_spinner: r#".loading, .spinner, [data-testid="loading"]"#,
    body: "body",
};

impl Selectors {
    pub fn category_link(&self, name: &str) -> Locator {
        Locator::xpath(format!("//a[text()={}]", xpath_literal(name)))
    }

    /// Accessible-role fallback for a category control.
    pub fn category_role(&self, name: &str) -> Locator {
        Locator::role("button", name)
    }

    pub fn search_field(&self) -> Locator {
        Locator::css(self.search_input).first()
    }

    pub fn cards(&self) -> Locator {
        Locator::css(self.content_card)
    }

    pub fn card_titles(&self) -> Locator {
        Locator::css(self.card_title)
    }

    /// A title paragraph whose normalized text equals `title`.
    pub fn content_title(&self, title: &str) -> Locator {
        Locator::xpath(format!("//p[normalize-space()={}]", xpath_literal(title))).first()
    }

    /// The first dropdown container's current value, which opens its menu.
    pub fn type_value(&self) -> Locator {
        Locator::css(self.type_single_value).within(Locator::css(self.type_dropdown).first())
    }

    pub fn type_menu(&self) -> Locator {
        Locator::xpath(self.type_menu)
    }

    pub fn movie_option(&self) -> Locator {
        Locator::xpath(self.movie_option)
    }

    pub fn tv_option(&self) -> Locator {
        Locator::xpath(self.tv_option)
    }

    pub fn type_option(&self, label: &str) -> Locator {
        Locator::css(self.type_option).has_text(label).first()
    }

    pub fn year_start(&self) -> Locator {
        Locator::css(self.year_start_input)
    }

    pub fn year_end(&self) -> Locator {
        Locator::css(self.year_end_input)
    }

    /// Radio control of the star at 0-based `index`.
    pub fn rating_star(&self, index: usize) -> Locator {
        Locator::css(r#"div[role="radio"]"#).within(Locator::css(self.rating_star).nth(index))
    }

    pub fn genre_control(&self) -> Locator {
        Locator::css(self.genre_control)
    }

    pub fn genre_menu(&self) -> Locator {
        Locator::css(self.genre_menu)
    }

    pub fn genre_option(&self, name: &str) -> Locator {
        Locator::css(self.genre_option).has_text(name)
    }

    pub fn next_page(&self) -> Locator {
        Locator::css(self.next_page)
    }

    pub fn previous_page(&self) -> Locator {
        Locator::css(self.previous_page)
    }

    pub fn page_link(&self, page: u32) -> Locator {
        Locator::css(format!(
            r#"{} a[role="button"][aria-label="Page {}"]"#,
            self.pagination_root, page
        ))
    }

    /// The pagination entry flagged as the current page.
    pub fn active_page(&self, page: u32) -> Locator {
        Locator::css(format!(
            r#"{} a[aria-current="page"][aria-label="Page {} is your current page"]"#,
            self.pagination_root, page
        ))
    }

    pub fn loading_spinner(&self) -> Locator {
        Locator::css(self.loading_spinner)
    }

    pub fn body(&self) -> Locator {
        Locator::css(self.body)
    }
}

/// Quote `text` as an XPath string literal.
///
/// XPath 1.0 has no escape syntax, so text holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

// ============================================================================
// Per-action bounded waits
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub category: Duration,
    pub dropdown: Duration,
    pub pagination: Duration,
    pub go_to_page: Duration,
    pub verify_page: Duration,
    pub visibility: Duration,
    pub titles: Duration,
    pub page_load: Duration,
    /// Default for actions without a dedicated bound
    pub action: Duration,
    pub genre_pause: Duration,
    pub go_to_page_pause: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            category: Duration::from_secs(5),
            dropdown: Duration::from_secs(5),
            pagination: Duration::from_secs(3),
            go_to_page: Duration::from_secs(5),
            verify_page: Duration::from_secs(3),
            visibility: Duration::from_secs(5),
            titles: Duration::from_secs(5),
            page_load: Duration::from_secs(10),
            action: Duration::from_secs(10),
            genre_pause: Duration::from_millis(500),
            go_to_page_pause: Duration::from_secs(1),
        }
    }
}

