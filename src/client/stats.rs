//! Tester statistics from the API's Prometheus `/metrics` page.

use crate::client::config::ProbeConfig;
use crate::client::http::ProbeClient;
use crate::client::validator::{validate_response, ValidationOptions};
use crate::shared::{ConfigError, ProbeFailure, UsageContext};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const SAMPLE_SUFFIXES: &[&str] = &["_bucket", "_sum", "_count", "_total", "_created"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    #[default]
    Untyped,
}

impl MetricType {
    fn parse(raw: &str) -> Self {
        match raw {
            "counter" => MetricType::Counter,
            "gauge" => MetricType::Gauge,
            "histogram" => MetricType::Histogram,
            "summary" => MetricType::Summary,
            _ => MetricType::Untyped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

impl Sample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricFamily {
    pub name: String,
    pub help: Option<String>,
    pub metric_type: MetricType,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            help: None,
            metric_type: MetricType::Untyped,
            samples: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.samples.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub families: Vec<MetricFamily>,
}

impl Metrics {
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|f| f.name == name)
    }
}

/// Parse a text exposition page; malformed lines are skipped
pub fn parse_metrics(text: &str) -> Metrics {
    let mut families: Vec<MetricFamily> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut family_for = |name: &str, families: &mut Vec<MetricFamily>| -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            families.push(MetricFamily::new(name));
            families.len() - 1
        })
    };

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let mut parts = comment.trim_start().splitn(3, char::is_whitespace);
            match (parts.next(), parts.next(), parts.next()) {
                (Some("HELP"), Some(name), help) => {
                    let at = family_for(name, &mut families);
                    families[at].help = Some(unescape_help(help.unwrap_or("").trim()));
                }
                (Some("TYPE"), Some(name), Some(kind)) => {
                    let at = family_for(name, &mut families);
                    families[at].metric_type = MetricType::parse(kind.trim());
                }
                _ => {}
            }
            continue;
        }

        match parse_sample(line) {
            Some(sample) => {
                let family = family_name(&sample.name, |name| {
                    families.iter().any(|f| f.name == name)
                });
                let at = family_for(&family, &mut families);
                families[at].samples.push(sample);
            }
            None => tracing::debug!("Skipping malformed metrics line {}: {}", number + 1, line),
        }
    }

    Metrics { families }
}

// `_bucket`, `_sum` etc. join the family they were declared under
fn family_name(sample: &str, known: impl Fn(&str) -> bool) -> String {
    if known(sample) {
        return sample.to_string();
    }
    SAMPLE_SUFFIXES
        .iter()
        .filter_map(|suffix| sample.strip_suffix(suffix))
        .find(|base| known(base))
        .unwrap_or(sample)
        .to_string()
}

fn parse_sample(line: &str) -> Option<Sample> {
    let name_end = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if !is_metric_name(name) {
        return None;
    }

    let mut rest = &line[name_end..];
    let mut labels = BTreeMap::new();
    if let Some(after_brace) = rest.strip_prefix('{') {
        let (parsed, remaining) = parse_labels(after_brace)?;
        labels = parsed;
        rest = remaining;
    }

    // Trailing timestamp ignored
    let value = parse_value(rest.split_whitespace().next()?)?;
    Some(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

// Returns the labels and the text after `}`
fn parse_labels(input: &str) -> Option<(BTreeMap<String, String>, &str)> {
    let mut labels = BTreeMap::new();
    let mut rest = input.trim_start();

    loop {
        if let Some(after) = rest.strip_prefix('}') {
            return Some((labels, after));
        }

        let eq = rest.find('=')?;
        let key = rest[..eq].trim();
        if !is_metric_name(key) {
            return None;
        }
        let quoted = rest[eq + 1..].trim_start().strip_prefix('"')?;

        let mut value = String::new();
        let mut chars = quoted.char_indices();
        let end = loop {
            match chars.next()? {
                (i, '"') => break i,
                (_, '\\') => match chars.next()? {
                    (_, 'n') => value.push('\n'),
                    (_, other) => value.push(other),
                },
                (_, c) => value.push(c),
            }
        };
        labels.insert(key.to_string(), value);

        rest = quoted[end + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
        } else if !rest.starts_with('}') {
            return None;
        }
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    match raw {
        "NaN" => Some(f64::NAN),
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

fn unescape_help(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[derive(Debug, Clone)]
pub struct StatsClient {
    client: ProbeClient,
    url: String,
}

impl StatsClient {
    pub fn new(client: ProbeClient, config: &ProbeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            url: config.metrics_url()?,
        })
    }

    pub async fn fetch(&self) -> Result<Metrics, ProbeFailure> {
        let response = self.client.get(&self.url).await?;
        let options = ValidationOptions::new(UsageContext::Federation).expecting("text/plain");
        if let Some(failure) = validate_response(&response, &options) {
            return Err(failure);
        }

        let metrics = parse_metrics(&response.body);
        tracing::debug!("Parsed {} metric families", metrics.families.len());
        Ok(metrics)
    }
}
