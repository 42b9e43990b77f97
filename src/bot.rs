use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // crawlers, link unfurlers and audit tools
    static ref BOT_PATTERN: Regex = Regex::new(r"(?i)bot|crawl|spider|media|lighthouse").unwrap();
}

pub fn is_bot(user_agent: &str) -> bool {
    BOT_PATTERN.is_match(user_agent)
}
