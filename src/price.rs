use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// A kroner amount: space/NBSP-grouped thousands or a plain digit run, with
/// an optional decimal component. The grouped alternative comes first so a
/// greedy digit run cannot capture just the leading group of "1 200".
const AMOUNT: &str = r"(?:\d{1,3}(?:[ \u{A0}]\d{3})+|\d+)(?:[.,]\d{1,2})?";

/// Currency-coded amount, e.g. "NOK 250", "kr 250,00" or "kr 1 200".
static CURRENCY_CODED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:NOK|kr\.?)\s*({AMOUNT})")).unwrap()
});

/// Informal Norwegian suffix form, e.g. "150 kr", "1 200 kr" or "300,00 kr,-".
static INFORMAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({AMOUNT})\s*kr\b")).unwrap());

/// One extraction strategy: free-form text in, normalized kroner amount out.
type Strategy = fn(&str) -> Option<String>;

/// Tried in priority order; the first hit wins.
const TEXT_STRATEGIES: &[Strategy] = &[currency_coded, informal_suffix];

/// Locates a price expression in free-form text and normalizes it to a plain
/// whole-kroner digit string. `None` when no pattern matches.
pub fn extract_from_text(text: &str) -> Option<String> {
    TEXT_STRATEGIES.iter().find_map(|strategy| strategy(text))
}

/// Extracts a price from page markup: structured price metadata first, then a
/// scan of the rendered body text. A structured value of zero is treated as an
/// unpopulated field rather than a confirmed free event, so it never produces
/// "0" on its own.
pub fn extract_from_markup(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Some(amount) = structured_price(&document) {
        return Some(amount);
    }
    extract_from_text(&rendered_text(&document))
}

fn currency_coded(text: &str) -> Option<String> {
    let captures = CURRENCY_CODED.captures(text)?;
    normalize_amount(captures.get(1)?.as_str())
}

fn informal_suffix(text: &str) -> Option<String> {
    let captures = INFORMAL_SUFFIX.captures(text)?;
    normalize_amount(captures.get(1)?.as_str())
}

/// Strips thousands separators and the decimal component ("300,00" -> "300").
/// The store carries whole kroner only.
fn normalize_amount(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{A0}')
        .collect();
    let whole = compact.split(&[',', '.'][..]).next()?;
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = whole.trim_start_matches('0');
    Some(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

fn structured_price(document: &Html) -> Option<String> {
    let meta_selectors = [
        "meta[itemprop=\"price\"]",
        "meta[property=\"product:price:amount\"]",
        "meta[property=\"og:price:amount\"]",
    ];
    for raw_selector in meta_selectors {
        let selector = Selector::parse(raw_selector).unwrap();
        for element in document.select(&selector) {
            if let Some(amount) = element.value().attr("content").and_then(positive_amount) {
                return Some(amount);
            }
        }
    }

    // microdata on ordinary elements: content attribute or the element text
    let selector = Selector::parse("[itemprop=\"price\"]").unwrap();
    for element in document.select(&selector) {
        let candidate = match element.value().attr("content") {
            Some(content) => content.to_string(),
            None => element.text().collect::<String>(),
        };
        if let Some(amount) = positive_amount(&candidate) {
            return Some(amount);
        }
    }
    None
}

/// Structured values are only trusted when strictly greater than zero.
/// Accepts a bare number ("250.00") or a short price expression ("495 kr").
fn positive_amount(raw: &str) -> Option<String> {
    let amount = normalize_amount(raw.trim()).or_else(|| extract_from_text(raw))?;
    if amount == "0" {
        return None;
    }
    Some(amount)
}

fn rendered_text(document: &Html) -> String {
    let body = Selector::parse("body").unwrap();
    let element = document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());
    element.text().collect::<Vec<_>>().join(" ")
}
