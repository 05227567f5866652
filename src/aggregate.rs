// src/aggregate.rs
//! Fallback clustering for backends that only serve raw articles.
//!
//! Articles are grouped by a cheap keyword signature of their title and each
//! group's metrics are folded in as articles arrive. The first article of a
//! group fixes its title, summary, sentiment, country and sector; later
//! articles only add sources and bump spread/pulse/velocity.

use std::collections::HashMap;

use crate::model::{label_or, RawArticle, UiTopic, DEFAULT_COUNTRY, DEFAULT_SECTOR};

/// Characters of article content kept in a group summary.
pub const SUMMARY_CHARS: usize = 150;
/// Tokens longer than this many characters count as keywords.
const MIN_TOKEN_CHARS: usize = 4;
/// Keywords per group key.
const KEY_TOKENS: usize = 3;

const BASE_PULSE: i64 = 50;
const PULSE_STEP: i64 = 10;
const MAX_PULSE: i64 = 100;

/// Signature used to bucket an article: the first three lower-cased title
/// tokens longer than four characters, sorted and space-joined.
///
/// Titles without such tokens all map to `""` and therefore share a group.
pub fn group_key(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut tokens: Vec<&str> = lowered
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .take(KEY_TOKENS)
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// First [`SUMMARY_CHARS`] characters of `content` plus `...`.
/// Absent or empty content yields an empty summary.
pub fn summarize(content: Option<&str>) -> String {
    match content {
        Some(c) if !c.is_empty() => {
            let mut out: String = c.chars().take(SUMMARY_CHARS).collect();
            out.push_str("...");
            out
        }
        _ => String::new(),
    }
}

/// Running state of one synthetic topic.
struct Group {
    title: String,
    summary: String,
    country: String,
    sector: String,
    sentiment: f64,
    sources: Vec<String>,
    articles: usize,
}

impl Group {
    fn seed(article: &RawArticle) -> Self {
        Self {
            title: article.title.clone(),
            summary: summarize(article.content.as_deref()),
            country: label_or(article.country.as_deref(), DEFAULT_COUNTRY),
            sector: label_or(article.sector.as_deref(), DEFAULT_SECTOR),
            sentiment: article.sentiment_score.unwrap_or(0.0),
            sources: vec![article.source.clone()],
            articles: 1,
        }
    }

    fn absorb(&mut self, article: &RawArticle) {
        self.sources.push(article.source.clone());
        self.articles += 1;
    }

    /// Articles merged on top of the seed.
    fn merged(&self) -> i64 {
        self.articles as i64 - 1
    }

    fn pulse(&self) -> i64 {
        (BASE_PULSE + PULSE_STEP * self.merged()).min(MAX_PULSE)
    }

    // Tenths keep 0.6, 0.7, ... exact instead of accumulating 0.1 steps.
    fn velocity(&self) -> f64 {
        (5 + self.merged()).min(10) as f64 / 10.0
    }

    fn into_topic(self, index: usize) -> UiTopic {
        let pulse = self.pulse();
        let velocity = self.velocity();
        UiTopic {
            id: format!("agg-{index}"),
            title: self.title,
            summary: self.summary,
            keywords: Vec::new(),
            country: self.country,
            sector: self.sector,
            pulse,
            velocity,
            spread: self.articles as f64,
            authority: None,
            novelty: None,
            volume: None,
            sentiment: self.sentiment,
            sources: self.sources,
            article_count: None,
            first_seen: None,
            last_updated: None,
        }
    }
}

/// Group `articles` into synthetic topics, highest pulse first.
///
/// Groups with equal pulse keep the order in which they were created.
pub fn aggregate(articles: &[RawArticle]) -> Vec<UiTopic> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for article in articles {
        let key = group_key(&article.title);
        match index.get(&key) {
            Some(&slot) => groups[slot].absorb(article),
            None => {
                index.insert(key, groups.len());
                groups.push(Group::seed(article));
            }
        }
    }

    tracing::debug!(
        target: "pulse::aggregate",
        articles = articles.len(),
        groups = groups.len(),
        "fallback grouping done"
    );

    let mut topics: Vec<UiTopic> = groups
        .into_iter()
        .enumerate()
        .map(|(i, g)| g.into_topic(i))
        .collect();
    sort_by_pulse(&mut topics);
    topics
}

/// Stable sort, highest pulse first.
pub fn sort_by_pulse(topics: &mut [UiTopic]) {
    topics.sort_by(|a, b| b.pulse.cmp(&a.pulse));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, source: &str) -> RawArticle {
        RawArticle {
            id: None,
            title: title.to_string(),
            content: None,
            source: source.to_string(),
            country: None,
            sector: None,
            sentiment_score: None,
            engagement_score: None,
            published_at: None,
            url: None,
            language: None,
        }
    }

    fn repeat(title: &str, n: usize) -> Vec<RawArticle> {
        (0..n).map(|i| article(title, &format!("src{i}"))).collect()
    }

    #[test]
    fn key_takes_first_three_long_tokens_then_sorts() {
        assert_eq!(
            group_key("Generative AI Schools Debate Continues Nationwide"),
            "debate generative schools"
        );
    }

    #[test]
    fn key_ignores_whitespace_runs_and_case() {
        assert_eq!(
            group_key("  SCHOOLS\t\tdebate   Generative "),
            group_key("Generative Schools Debate")
        );
    }

    #[test]
    fn key_counts_characters_not_bytes() {
        // "città" is five characters but six bytes.
        assert_eq!(group_key("città però"), "città");
    }

    #[test]
    fn short_titles_collapse_to_empty_key() {
        assert_eq!(group_key("A B C"), "");
        assert_eq!(group_key(""), "");
    }

    #[test]
    fn summary_truncates_and_marks() {
        let long = "x".repeat(400);
        let s = summarize(Some(&long));
        assert_eq!(s.chars().count(), SUMMARY_CHARS + 3);
        assert!(s.ends_with("..."));
        assert_eq!(summarize(Some("short")), "short...");
        assert_eq!(summarize(None), "");
        assert_eq!(summarize(Some("")), "");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn single_article_seeds_defaults() {
        let mut a = article("Generative AI Schools Debate", "ANSA");
        a.content = Some("Dibattito su uso di LLM in esami e compiti.".into());
        a.sentiment_score = Some(-0.1);
        let out = aggregate(&[a]);
        assert_eq!(out.len(), 1);
        let t = &out[0];
        assert_eq!(t.spread, 1.0);
        assert_eq!(t.pulse, 50);
        assert_eq!(t.velocity, 0.5);
        assert_eq!(t.sentiment, -0.1);
        assert_eq!(t.country, "GLOBAL");
        assert_eq!(t.sector, "News");
        assert_eq!(t.sources, vec!["ANSA"]);
        assert_eq!(t.summary, "Dibattito su uso di LLM in esami e compiti....");
        assert_eq!(t.id, "agg-0");
        assert!(t.authority.is_none());
        assert!(t.novelty.is_none());
        assert!(t.volume.is_none());
        assert!(t.article_count.is_none());
    }

    #[test]
    fn second_matching_article_merges() {
        let out = aggregate(&[
            article("Generative AI Schools Debate", "ANSA"),
            article("Schools debate generative tools", "Repubblica"),
        ]);
        assert_eq!(out.len(), 1);
        let t = &out[0];
        assert_eq!(t.spread, 2.0);
        assert_eq!(t.pulse, 60);
        assert!((t.velocity - 0.6).abs() < 1e-9);
        assert_eq!(t.sources.len(), 2);
    }

    #[test]
    fn pulse_and_velocity_cap() {
        let five = aggregate(&repeat("Calciomercato invernale trattative", 5));
        assert_eq!(five[0].pulse, 90);
        let six = aggregate(&repeat("Calciomercato invernale trattative", 6));
        assert_eq!(six[0].pulse, 100);
        assert_eq!(six[0].velocity, 1.0);
        let nine = aggregate(&repeat("Calciomercato invernale trattative", 9));
        assert_eq!(nine[0].pulse, 100);
        assert_eq!(nine[0].velocity, 1.0);
        assert_eq!(nine[0].spread, 9.0);
    }

    #[test]
    fn first_article_wins_metadata() {
        let mut first = article("Nuovo chip europeo annunciato", "Tagesschau");
        first.country = Some("DE".into());
        first.sector = Some("Tech".into());
        first.sentiment_score = Some(0.2);
        first.content = Some("Annuncio chip EU per edge AI.".into());
        let mut second = article("Nuovo chip europeo annunciato", "Reddit");
        second.country = Some("IT".into());
        second.sector = Some("Finanza".into());
        second.sentiment_score = Some(-0.9);
        second.content = Some("altro".into());

        let t = &aggregate(&[first, second])[0];
        assert_eq!(t.country, "DE");
        assert_eq!(t.sector, "Tech");
        assert_eq!(t.sentiment, 0.2);
        assert_eq!(t.summary, "Annuncio chip EU per edge AI....");
        assert_eq!(t.sources, vec!["Tagesschau", "Reddit"]);
    }

    #[test]
    fn duplicate_sources_are_kept() {
        let out = aggregate(&repeat_source("Mercati europei chiusura positiva", "ANSA", 2));
        assert_eq!(out[0].sources, vec!["ANSA", "ANSA"]);
        assert_eq!(out[0].spread, 2.0);
    }

    fn repeat_source(title: &str, source: &str, n: usize) -> Vec<RawArticle> {
        (0..n).map(|_| article(title, source)).collect()
    }

    #[test]
    fn tokenless_titles_merge() {
        let out = aggregate(&[article("A B C", "HN"), article("Oggi in Roma", "RSS")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "A B C");
        assert_eq!(out[0].spread, 2.0);
    }

    #[test]
    fn output_is_sorted_by_pulse_desc() {
        let mut input = repeat("Inflazione eurozona ottobre", 3); // 70
        input.extend(repeat("Elezioni regionali risultati", 6)); // 100
        input.extend(repeat("Sciopero trasporti nazionale", 5)); // 90
        let pulses: Vec<i64> = aggregate(&input).iter().map(|t| t.pulse).collect();
        assert_eq!(pulses, vec![100, 90, 70]);
    }

    #[test]
    fn ties_keep_creation_order() {
        let out = aggregate(&[
            article("Primo argomento importante", "a"),
            article("Secondo argomento diverso", "b"),
            article("Terzo titolo qualsiasi", "c"),
        ]);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["agg-0", "agg-1", "agg-2"]);
    }

    #[test]
    fn sort_by_pulse_orders_arbitrary_pulses() {
        let base = aggregate(&[article("Placeholder topic title", "x")]).remove(0);
        let mut topics: Vec<UiTopic> = [(100, "a"), (70, "b"), (85, "c")]
            .into_iter()
            .map(|(p, id)| UiTopic {
                id: id.to_string(),
                pulse: p,
                ..base.clone()
            })
            .collect();
        sort_by_pulse(&mut topics);
        let pulses: Vec<i64> = topics.iter().map(|t| t.pulse).collect();
        assert_eq!(pulses, vec![100, 85, 70]);
    }

    #[test]
    fn rerun_is_deterministic() {
        let input = vec![
            article("Generative AI Schools Debate", "ANSA"),
            article("Calciomercato invernale trattative", "GDELT"),
            article("Schools Generative Debate", "YouTube"),
        ];
        assert_eq!(aggregate(&input), aggregate(&input));
    }
}
