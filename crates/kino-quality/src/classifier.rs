//! Source classification
//!
//! Groups candidate sources into qualities:
//! - resolves each source's type from its MIME or file extension
//! - drops sources the media engine cannot play
//! - tags untagged sources by run-length grouping on type
//! - keeps one representative per quality, preferring the platform container

use crate::types::{CanPlay, ContainerFormat, QualityTag, SourceDescriptor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// MIME type of DASH manifests
pub const DASH_MIME: &str = "application/dash+xml";

/// A quality bucket and its representative source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quality {
    pub label: String,
    pub representative: SourceDescriptor,
}

/// Entry of the quality chooser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    pub name: String,
    pub label: String,
}

/// Qualities in classification order, keyed by tag name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMap {
    entries: IndexMap<String, Quality>,
}

impl QualityMap {
    pub fn get(&self, name: &str) -> Option<&Quality> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the first classified quality
    pub fn first_name(&self) -> Option<&str> {
        self.entries.keys().next().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quality)> {
        self.entries.iter().map(|(name, quality)| (name.as_str(), quality))
    }

    /// Chooser entries in display order (reverse of classification order)
    pub fn reversed_entries(&self) -> Vec<QualityOption> {
        self.entries
            .iter()
            .rev()
            .map(|(name, quality)| QualityOption {
                name: name.clone(),
                label: quality.label.clone(),
            })
            .collect()
    }
}

/// Resolve the type string of a source.
///
/// Uses the declared MIME, else `video/<ext>` from the path. Codecs, when
/// present, are appended as a `codecs` parameter.
pub fn source_type(source: &SourceDescriptor) -> Option<String> {
    let base = match source.mime.as_deref().filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => format!("video/{}", path_extension(&source.path)?),
    };

    Some(match source.codecs.as_deref().filter(|c| !c.is_empty()) {
        Some(codecs) => format!("{}; codecs=\"{}\"", base, codecs),
        None => base,
    })
}

/// Trailing `.ext` made of word characters
fn path_extension(path: &str) -> Option<&str> {
    let (_, ext) = path.rsplit_once('.')?;
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if !ext.is_empty() && ext.chars().all(is_word) {
        Some(ext)
    } else {
        None
    }
}

/// Container subtype of a source: `mp4` for `video/mp4; codecs=...`
fn container_subtype(source: &SourceDescriptor, resolved_type: &str) -> Option<String> {
    let mime = source
        .mime
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(resolved_type);
    let essence = mime.split(';').next()?.trim();
    essence.split('/').nth(1).map(|s| s.to_ascii_lowercase())
}

/// True if any source is a DASH manifest this player can hand to its engine
pub fn can_play(sources: &[SourceDescriptor]) -> bool {
    sources.iter().any(|source| {
        source.mime.as_deref() == Some(DASH_MIME) || source.path.ends_with(".mpd")
    })
}

/// Sorts sources into qualities
#[derive(Debug, Clone, Default)]
pub struct SourceClassifier {
    preferred: ContainerFormat,
}

impl SourceClassifier {
    pub fn new(preferred: ContainerFormat) -> Self {
        Self { preferred }
    }

    pub fn preferred_format(&self) -> &ContainerFormat {
        &self.preferred
    }

    /// Classify `sources` into a quality map.
    ///
    /// Every kept source is stamped in place with its resolved type and
    /// quality tag. Sources without a type or rejected by `can_play_type` are
    /// skipped and left untouched.
    #[instrument(skip_all, fields(sources = sources.len(), preferred = %self.preferred))]
    pub fn classify<F>(&self, sources: &mut [SourceDescriptor], can_play_type: F) -> QualityMap
    where
        F: Fn(&str) -> CanPlay,
    {
        let mut map = QualityMap::default();
        let mut next_index = 1;
        // Tag name of the previous kept source, explicit or minted
        let mut previous: Option<String> = None;
        let mut last_minted: Option<QualityTag> = None;

        for source in sources.iter_mut() {
            let Some(resolved) = source_type(source) else {
                debug!(path = %source.path, "No type for source, skipping");
                continue;
            };

            if !can_play_type(&resolved).is_playable() {
                debug!(path = %source.path, source_type = %resolved, "Unplayable source, skipping");
                continue;
            }

            let tag = match source.quality.clone() {
                Some(tag) => tag,
                None => {
                    let previous_type = previous
                        .as_deref()
                        .and_then(|name| map.entries.get(name))
                        .and_then(|quality| quality.representative.source_type.as_deref());
                    let inherited = last_minted
                        .as_ref()
                        .filter(|_| previous_type == Some(resolved.as_str()))
                        .cloned();
                    match inherited {
                        Some(minted) => minted,
                        None => {
                            let tag = QualityTag::numbered(next_index);
                            next_index += 1;
                            last_minted = Some(tag.clone());
                            tag
                        }
                    }
                }
            };

            source.source_type = Some(resolved.clone());
            source.quality = Some(tag.clone());
            previous = Some(tag.name.clone());

            match map.entries.get_mut(&tag.name) {
                Some(existing) => {
                    let subtype = container_subtype(source, &resolved);
                    if subtype.as_deref() == Some(self.preferred.subtype()) {
                        debug!(
                            quality = %tag.name,
                            path = %source.path,
                            "Preferred container replaces representative"
                        );
                        existing.representative = source.clone();
                    }
                }
                None => {
                    map.entries.insert(
                        tag.name.clone(),
                        Quality {
                            label: tag.label.clone(),
                            representative: source.clone(),
                        },
                    );
                }
            }
        }

        debug!(qualities = map.len(), "Sources classified");
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_all(_: &str) -> CanPlay {
        CanPlay::Probably
    }

    fn mp4(path: &str) -> SourceDescriptor {
        SourceDescriptor::new(path).with_mime("video/mp4")
    }

    fn webm(path: &str) -> SourceDescriptor {
        SourceDescriptor::new(path).with_mime("video/webm")
    }

    #[test]
    fn test_type_from_mime_and_codecs() {
        let source = mp4("a.mp4").with_codecs("avc1.42E01E");
        assert_eq!(
            source_type(&source).as_deref(),
            Some("video/mp4; codecs=\"avc1.42E01E\"")
        );
    }

    #[test]
    fn test_type_from_extension() {
        assert_eq!(
            source_type(&SourceDescriptor::new("media/clip.webm")).as_deref(),
            Some("video/webm")
        );
        assert_eq!(source_type(&SourceDescriptor::new("media/clip")), None);
        assert_eq!(source_type(&SourceDescriptor::new("clip.mp4?t=3")), None);
    }

    #[test]
    fn test_run_length_grouping() {
        let mut sources = vec![mp4("1.mp4"), mp4("2.mp4"), webm("3.webm"), mp4("4.mp4")];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["q1", "q2", "q3"]);
        assert_eq!(sources[0].quality.as_ref().unwrap().name, "q1");
        assert_eq!(sources[1].quality.as_ref().unwrap().name, "q1");
        assert_eq!(sources[2].quality.as_ref().unwrap().name, "q2");
        assert_eq!(sources[3].quality.as_ref().unwrap().name, "q3");
        assert_eq!(map.get("q2").unwrap().label, "Quality 2");
    }

    #[test]
    fn test_untagged_source_inherits_last_minted_tag() {
        let hd = QualityTag::new("hd", "720p");
        let mut sources = vec![mp4("a.mp4"), mp4("b.mp4").with_quality(hd), mp4("c.mp4")];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["q1", "hd"]);
        assert_eq!(sources[2].quality.as_ref().unwrap().name, "q1");
        assert_eq!(map.get("q1").unwrap().representative.path, "c.mp4");
    }

    #[test]
    fn test_untagged_source_compares_with_previous_representative() {
        let hd = QualityTag::new("hd", "720p");
        let mut sources = vec![
            mp4("a.mp4").with_quality(hd.clone()),
            webm("b.webm").with_quality(hd),
            webm("c.webm"),
        ];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);

        assert_eq!(map.get("hd").unwrap().representative.path, "a.mp4");
        assert_eq!(sources[2].quality.as_ref().unwrap().name, "q1");
        assert_eq!(map.get("q1").unwrap().representative.path, "c.webm");
    }

    #[test]
    fn test_first_untagged_source_mints_after_explicit_tags() {
        let sd = QualityTag::new("sd", "360p");
        let mut sources = vec![mp4("sd.mp4").with_quality(sd), mp4("extra.mp4")];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);

        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["sd", "q1"]);
    }

    #[test]
    fn test_unplayable_sources_are_dropped() {
        let mut sources = vec![
            SourceDescriptor::new("no-extension"),
            webm("a.webm"),
            mp4("b.mp4"),
        ];
        let map = SourceClassifier::default().classify(&mut sources, |t| {
            if t.starts_with("video/mp4") {
                CanPlay::Maybe
            } else {
                CanPlay::Empty
            }
        });

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("q1").unwrap().representative.path, "b.mp4");
        assert!(sources[0].source_type.is_none());
        assert!(sources[1].quality.is_none());
    }

    #[test]
    fn test_preferred_container_replaces_representative() {
        let hd = QualityTag::new("hd", "720p");
        let mut sources = vec![
            webm("hd.webm").with_quality(hd.clone()),
            mp4("hd.mp4").with_quality(hd.clone()),
        ];
        let map = SourceClassifier::new(ContainerFormat::Mp4).classify(&mut sources, accept_all);
        assert_eq!(map.get("hd").unwrap().representative.path, "hd.mp4");

        let mut sources = vec![
            mp4("hd.mp4").with_quality(hd.clone()),
            webm("hd.webm").with_quality(hd),
        ];
        let map = SourceClassifier::new(ContainerFormat::Webm).classify(&mut sources, accept_all);
        assert_eq!(map.get("hd").unwrap().representative.path, "hd.webm");
    }

    #[test]
    fn test_first_representative_kept_without_preference_match() {
        let sd = QualityTag::new("sd", "360p");
        let mut sources = vec![
            webm("sd-a.webm").with_quality(sd.clone()),
            SourceDescriptor::new("sd-b.ogv")
                .with_mime("video/ogg")
                .with_quality(sd),
        ];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);
        assert_eq!(map.get("sd").unwrap().representative.path, "sd-a.webm");
    }

    #[test]
    fn test_reversed_entries() {
        let mut sources = vec![mp4("1.mp4"), webm("2.webm")];
        let map = SourceClassifier::default().classify(&mut sources, accept_all);
        let options = map.reversed_entries();
        assert_eq!(options[0].name, "q2");
        assert_eq!(options[1].name, "q1");
    }

    #[test]
    fn test_can_play_dash_only() {
        assert!(can_play(&[SourceDescriptor::new("stream.mpd")]));
        assert!(can_play(&[SourceDescriptor::new("manifest").with_mime(DASH_MIME)]));
        assert!(!can_play(&[mp4("clip.mp4")]));
        assert!(!can_play(&[]));
    }
}
