//! Generic HTML listing-page scraper.
//!
//! Each configured page is fetched with a browser User-Agent after the
//! board's politeness delay, then parsed with CSS selectors: one selector
//! finds the job cards, nested selectors pull title, company, location and
//! link out of each card. Cards without a title are skipped. A page with no
//! matching cards at all usually means the markup changed (or the listing is
//! rendered client-side), so it is reported as a shape error.

use super::{SourceAdapter, apply_location_filter, resolve_link};
use crate::config::{HtmlBoard, RequestPolicy};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{JobPosting, NOT_AVAILABLE};
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Compiled selectors for one board.
#[derive(Debug)]
pub(crate) struct CardSelectors {
    card: Selector,
    title: Selector,
    company: Option<Selector>,
    location: Option<Selector>,
    link: Option<Selector>,
}

impl CardSelectors {
    pub(crate) fn from_board(board: &HtmlBoard) -> Result<Self, FetchError> {
        Ok(Self {
            card: parse_selector(&board.card_selector)?,
            title: parse_selector(&board.title_selector)?,
            company: board.company_selector.as_deref().map(parse_selector).transpose()?,
            location: board.location_selector.as_deref().map(parse_selector).transpose()?,
            link: board.link_selector.as_deref().map(parse_selector).transpose()?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|_| FetchError::Selector(selector.to_string()))
}

#[derive(Debug)]
pub struct HtmlBoardAdapter {
    board: HtmlBoard,
    name: String,
}

impl HtmlBoardAdapter {
    pub fn new(board: HtmlBoard) -> Self {
        let name = format!("html:{}", board.name);
        Self { board, name }
    }
}

#[async_trait]
impl SourceAdapter for HtmlBoardAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> &RequestPolicy {
        &self.board.policy
    }

    #[instrument(level = "info", skip_all, fields(source = %self.name, url = %self.board.url))]
    async fn fetch(&self, http: &HttpClient) -> Result<Vec<JobPosting>, FetchError> {
        // Fail on bad configuration before touching the network.
        let selectors = CardSelectors::from_board(&self.board)?;
        let url = Url::parse(&self.board.url)?;
        let base = match &self.board.base_url {
            Some(base) => Url::parse(base)?,
            None => url.clone(),
        };

        let html = http.get_text(&url, &self.board.policy).await?;
        info!(bytes = html.len(), "Fetched listing page");

        let postings = parse_listings(&self.name, &html, &selectors, &self.board, &base)?;
        let postings = apply_location_filter(&self.name, postings, &self.board.location_filter);
        info!(count = postings.len(), "Parsed HTML listings");
        Ok(postings)
    }
}

/// Extract postings from a listing page.
pub(crate) fn parse_listings(
    source: &str,
    html: &str,
    selectors: &CardSelectors,
    board: &HtmlBoard,
    base: &Url,
) -> Result<Vec<JobPosting>, FetchError> {
    let document = Html::parse_document(html);
    let cards: Vec<ElementRef> = document.select(&selectors.card).collect();
    if cards.is_empty() {
        return Err(FetchError::Shape(format!(
            "no listings matched `{}`; the page structure changed or is rendered by JavaScript",
            board.card_selector
        )));
    }
    debug!(source, cards = cards.len(), "Matched job cards");

    let company_fallback = board.company_fallback.as_deref().unwrap_or(NOT_AVAILABLE);
    let mut postings = Vec::new();

    for (index, card) in cards.into_iter().take(board.max_items).enumerate() {
        let Some(title_el) = card.select(&selectors.title).next() else {
            debug!(source, card = index + 1, "Skipping card without a title element");
            continue;
        };
        let title = element_text(title_el);
        if title.is_empty() {
            debug!(source, card = index + 1, "Skipping card with an empty title");
            continue;
        }

        let company = selectors
            .company
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .map(element_text)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| company_fallback.to_string());

        let location = selectors
            .location
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .map(element_text);

        let link_el = match &selectors.link {
            Some(sel) => card.select(sel).next(),
            None => Some(title_el),
        };
        let link = link_el
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| resolve_link(source, base, href));

        postings.push(JobPosting::new(
            Some(&title),
            &company,
            location.as_deref(),
            NOT_AVAILABLE,
            link.as_deref(),
        ));
    }

    Ok(postings)
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}
