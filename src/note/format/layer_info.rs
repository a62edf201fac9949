//! Parsing of the `LAYERINFO` page field and its assignment to layers.
//!
//! `LAYERINFO` is a JSON-like array whose records use `#` instead of `:`
//! (colons are reserved by the tag syntax):
//!
//! ```text
//! [{"layerId"#3,"name"#"Layer 3","isVisible"#true},{...},{...}]
//! ```

use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use crate::note::types::models::{Layer, LayerInfo};
use crate::note::utils;

static RECORD_PATTERN: OnceLock<Regex> = OnceLock::new();
static INFO_PATTERN: OnceLock<Regex> = OnceLock::new();

fn record_regex() -> &'static Regex {
    RECORD_PATTERN.get_or_init(|| Regex::new(r"\{.*?\}").expect("Invalid layer record regex pattern"))
}

fn info_regex() -> &'static Regex {
    INFO_PATTERN.get_or_init(|| {
        Regex::new(r##""(\w+)"#"?([\w\d\s\-]+)"?"##).expect("Invalid layer info regex pattern")
    })
}

/// Splits a raw `LAYERINFO` value into one [`LayerInfo`] per `{...}` group.
pub fn parse_records(raw: &str) -> Vec<LayerInfo> {
    record_regex()
        .find_iter(raw)
        .map(|group| LayerInfo {
            fields: utils::extract_pairs(info_regex(), group.as_str()),
        })
        .collect()
}

/// Attaches info records to the layers of one page.
///
/// The last two records always describe the main and background layers,
/// which are physically the first and last layers of the page, so they are
/// assigned by position. Interior layers only get a record whose normalized
/// name equals their `LAYERNAME`.
pub fn attach(layers: &mut [Layer], records: &[LayerInfo]) {
    let Some(last_index) = layers.len().checked_sub(1) else {
        return;
    };
    let split = records.len().saturating_sub(2);
    let (named, positional) = records.split_at(split);

    match positional {
        [first, last] => {
            layers[0].info = Some(first.clone());
            layers[last_index].info = Some(last.clone());
        }
        [only] => layers[last_index].info = Some(only.clone()),
        _ => return,
    }

    if layers.len() > 2 {
        for layer in &mut layers[1..last_index] {
            // The last matching record wins.
            let matched = named
                .iter()
                .rev()
                .find(|info| info.normalized_name().as_deref() == Some(layer.name.as_str()));
            if let Some(info) = matched {
                trace!("Layer '{}' matched info record {:?}", layer.name, info.name());
                layer.info = Some(info.clone());
            }
        }
    }
}
