//! Natural-language rule parser.
//!
//! Maps a sentence such as `"btc cair mais de 5% em 1h"` or
//! `"nvidia appears in more than 3 sources on the same day"` to [`RuleParams`].
//! Patterns are fixed; anything else is a normal `None`, never an error.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ CryptoDropPercentParams, NewsMultiSourceParams, RuleParams, MAX_TIMEFRAME_HOURS };
use crate::enums::NewsWindow;

/// Symbols the crypto drop pattern recognises.
pub const KNOWN_SYMBOLS: [&str; 7] = ["btc", "eth", "sol", "ada", "dot", "link", "bnb"];

lazy_static! {
    static ref LEAD_IN: Regex = Regex::new(
        r"^(?:me\s+avise\s+se|avise-me\s+se|alert\s+me\s+if|notify\s+me\s+if|let\s+me\s+know\s+if|tell\s+me\s+if)\s+"
    ).expect("lead-in pattern is valid");

    static ref CRYPTO_DROP: Regex = Regex::new(
        r"\b(btc|eth|sol|ada|dot|link|bnb)\s+(?:cair(?:\s+mais)?|queda|cai|drops?|falls?)\s+(?:de\s+|more\s+than\s+|over\s+|by\s+)?(\d+(?:[.,]\d+)?)\s*[%％]\s+(?:em|in)\s+(\d+)\s*(?:hours?|horas?|hrs?|h)\b"
    ).expect("crypto drop pattern is valid");

    static ref NEWS_MULTI_SOURCE: Regex = Regex::new(
        r"(\w[\w\s\-.]*?)\s+(?:aparecer\s+em\s+mais\s+de|appears?\s+in\s+more\s+than)\s+(\d+)\s+(?:fontes\s+no\s+mesmo\s+dia|sources\s+on\s+the\s+same\s+day)"
    ).expect("news multi-source pattern is valid");
}

/// Parse a rule sentence. Input is trimmed and lowercased first; identical
/// input always yields identical output.
pub fn parse_rule(text: &str) -> Option<RuleParams> {
    let normalized = text.trim().to_lowercase();
    let body = LEAD_IN.replace(&normalized, "");

    parse_crypto_drop(&body).or_else(|| parse_news_multi_source(&body))
}

fn parse_crypto_drop(text: &str) -> Option<RuleParams> {
    let caps = CRYPTO_DROP.captures(text)?;

    let symbol = caps.get(1)?.as_str().to_string();
    let percent = caps.get(2)?.as_str().replace(',', ".").parse::<f64>().ok()?;
    let timeframe_hours = caps.get(3)?.as_str().parse::<u32>().ok()?;
    if timeframe_hours > MAX_TIMEFRAME_HOURS {
        return None;
    }

    Some(
        RuleParams::CryptoDropPercent(CryptoDropPercentParams {
            symbol,
            percent,
            timeframe_hours,
        })
    )
}

fn parse_news_multi_source(text: &str) -> Option<RuleParams> {
    let caps = NEWS_MULTI_SOURCE.captures(text)?;

    let keyword = caps.get(1)?.as_str().trim().to_string();
    if keyword.is_empty() {
        return None;
    }
    let min_sources = caps.get(2)?.as_str().parse::<u32>().ok()?;

    Some(
        RuleParams::NewsMultiSource(NewsMultiSourceParams {
            keyword,
            min_sources,
            window: NewsWindow::SameDay,
        })
    )
}
