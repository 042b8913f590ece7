//! Read-only catalog of symbols that can be dragged onto the site.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// MIME type of the drag payload.
pub const SYMBOL_MIME: &str = "application/x-wellpad-symbol";

/// Image extensions picked up when scanning a symbol directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// One palette entry. Serialized as the drag payload `{name, src, key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteItem {
    pub name: String,
    pub src: String,
    pub key: String,
}

impl PaletteItem {
    pub fn new(name: impl Into<String>, src: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            key: key.into(),
        }
    }

    /// Serialize as a drag payload.
    pub fn to_payload(&self) -> String {
        // Three string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse a drop payload produced by [`PaletteItem::to_payload`].
pub fn parse_payload(payload: &str) -> Result<PaletteItem, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Immutable symbol catalog. Cloning shares the same items.
#[derive(Debug, Clone)]
pub struct Palette {
    items: Arc<[PaletteItem]>,
}

impl Palette {
    pub fn new(items: Vec<PaletteItem>) -> Self {
        Self { items: items.into() }
    }

    /// Built-in wellsite equipment entries; `src` is relative to `base`.
    pub fn builtin(base: &str) -> Self {
        let entries = [
            ("Wellhead", "wellhead"),
            ("Frac Tank", "frac-tank"),
            ("Pump Truck", "pump-truck"),
            ("Blender", "blender"),
            ("Sand Silo", "sand-silo"),
            ("Data Van", "data-van"),
            ("Water Transfer", "water-transfer"),
            ("Crane", "crane"),
        ];
        Self::new(
            entries
                .iter()
                .map(|(name, key)| PaletteItem::new(*name, format!("{base}/{key}.png"), *key))
                .collect(),
        )
    }

    /// Built-in entries plus every image file in `dir`. A missing or
    /// unreadable directory yields just the built-ins.
    pub fn with_directory(base: &str, dir: &Path) -> Self {
        let mut items: Vec<PaletteItem> = Self::builtin(base).items.to_vec();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Could not read symbol directory {}: {}", dir.display(), e);
                return Self::new(items);
            }
        };

        let mut found: Vec<PaletteItem> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.to_string();
                let key = stem.to_ascii_lowercase().replace(' ', "-");
                let name = display_name(&stem);
                Some(PaletteItem::new(name, path.to_string_lossy(), key))
            })
            .filter(|item| !items.iter().any(|existing| existing.key == item.key))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!("Loaded {} symbols from {}", found.len(), dir.display());
        items.extend(found);
        Self::new(items)
    }

    pub fn items(&self) -> &[PaletteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `frac_tank` / `frac-tank` -> `Frac Tank`.
fn display_name(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_roundtrip() {
        let item = PaletteItem::new("Frac Tank", "symbols/frac-tank.png", "frac-tank");
        let payload = item.to_payload();
        assert!(payload.contains("\"src\""));
        assert_eq!(parse_payload(&payload).ok(), Some(item));
    }

    #[test]
    fn test_malformed_payload_is_error() {
        assert!(parse_payload("{\"name\": \"x\"}").is_err());
        assert!(parse_payload("garbage").is_err());
    }

    #[test]
    fn test_builtin_palette() {
        let palette = Palette::builtin("symbols");
        assert!(!palette.is_empty());
        let wellhead = palette.items().iter().find(|item| item.key == "wellhead");
        assert_eq!(wellhead.map(|i| i.src.as_str()), Some("symbols/wellhead.png"));
        let shared = palette.clone();
        assert_eq!(shared.items().as_ptr(), palette.items().as_ptr());
    }

    #[test]
    fn test_missing_directory_falls_back_to_builtin() {
        let palette = Palette::with_directory("symbols", Path::new("/definitely/not/here"));
        assert_eq!(palette.len(), Palette::builtin("symbols").len());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("frac_tank"), "Frac Tank");
        assert_eq!(display_name("light-plant 2"), "Light Plant 2");
    }
}
