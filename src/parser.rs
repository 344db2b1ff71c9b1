//! Ad hoc extraction of named financial fields from the kabutan finance page.
//!
//! The markup is not ours and changes without notice, so nothing here tries to
//! be a general HTML parser: fields are located by the same anchors a human
//! would scan for (the symbol header block, the `stockinfo_i3` definition
//! list, labeled table cells) and everything downstream of a missing anchor
//! degrades to a per-code parse failure.

use std::collections::HashMap;

use crate::error::FetchError;
use crate::metrics::Metric;
use crate::source::RawFields;

/// Parses a ratio-like text value, stripping known unit markers first.
///
/// Handles values as rendered by the source: `"1.23倍"`, `"55.0％"`,
/// `"8.2%"`, `"1,000円"`. Anything left non-numeric after stripping
/// (placeholders like `"－"`, truncated cells) is a [`FetchError::Parse`].
pub fn parse_ratio(text: &str) -> Result<f64, FetchError> {
    const UNIT_MARKERS: [&str; 4] = ["倍", "％", "%", "円"];

    let mut cleaned = text.trim().to_string();
    for marker in UNIT_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned = cleaned.replace(',', "");

    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| FetchError::parse(format!("not a number: '{}'", text.trim())))
}

/// Extracts the instrument display name and every locatable metric value.
///
/// Only the name is mandatory at this stage; per-metric presence is checked
/// during resolution so the failure message can say which field was missing.
pub fn extract_fields(html: &str, code: &str) -> Result<RawFields, FetchError> {
    let name = instrument_name(html, code)?;

    let mut values = HashMap::new();
    for metric in Metric::ALL {
        let raw = match metric {
            // PBR lives in the stock info strip, second <dd> (PER is first).
            Metric::Pbr => stockinfo_value(html, 1)
                .or_else(|| labeled_value(html, metric.label())),
            _ => labeled_value(html, metric.label()),
        };

        if let Some(value) = raw {
            if !value.is_empty() {
                values.insert(metric, value);
            }
        }
    }

    Ok(RawFields { name, values })
}

/// Pulls the instrument name out of the symbol header block. The `<h1>` text
/// embeds the security code, which is removed to leave the bare name.
fn instrument_name(html: &str, code: &str) -> Result<String, FetchError> {
    let block = section(html, "class=\"symbol\"")
        .ok_or_else(|| FetchError::parse("symbol header block missing"))?;
    let (heading, _) = tag_inner(block, "h1")
        .ok_or_else(|| FetchError::parse("symbol heading missing"))?;

    let name = strip_tags(heading).replace(code, "").trim().to_string();
    if name.is_empty() {
        return Err(FetchError::parse("instrument name empty"));
    }
    Ok(name)
}

/// Text of the n-th `<dd>` inside the `stockinfo_i3` definition list.
fn stockinfo_value(html: &str, index: usize) -> Option<String> {
    let block = section(html, "id=\"stockinfo_i3\"")?;
    let text = strip_tags(nth_tag_inner(block, "dd", index)?);
    (!text.is_empty()).then_some(text)
}

/// Text of the first `<td>` following a cell whose text is exactly `label`.
fn labeled_value(html: &str, label: &str) -> Option<String> {
    let needle = format!(">{label}<");
    let pos = html.find(&needle)?;
    let (cell, _) = tag_inner(&html[pos..], "td")?;
    let text = strip_tags(cell);
    (!text.is_empty()).then_some(text)
}

/// Slice from the first occurrence of `anchor` up to the enclosing
/// element's closing `</div>`.
fn section<'a>(html: &'a str, anchor: &str) -> Option<&'a str> {
    let start = html.find(anchor)?;
    let rest = &html[start..];
    let end = rest.find("</div>").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Returns the inner text of the first `<tag ...>...</tag>` pair, plus the
/// remainder of the input after the closing tag.
fn tag_inner<'a>(s: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = s.find(&open)?;
    let after_open = &s[start + open.len()..];
    let gt = after_open.find('>')?;
    let body = &after_open[gt + 1..];
    let end = body.find(&close)?;

    Some((&body[..end], &body[end + close.len()..]))
}

fn nth_tag_inner<'a>(s: &'a str, tag: &str, n: usize) -> Option<&'a str> {
    let mut rest = s;
    for _ in 0..n {
        let (_, after) = tag_inner(rest, tag)?;
        rest = after;
    }
    tag_inner(rest, tag).map(|(inner, _)| inner)
}

/// Drops markup and collapses whitespace, leaving display text.
fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
