//! Site document: the single owner of wells, spacings, the orientation marker
//! and placed symbols.
//!
//! Every mutation goes through [`SiteDocument`] so two invariants hold after
//! each call: there is one spacing per adjacent well pair, and at most one
//! entity is selected.

use crate::config::DocumentDefaults;
use crate::entities::{
    EntityId, EntityRef, LengthUnit, LibrarySymbol, OrientationMarker, Spacing, SymbolTransform,
    Well,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Non-finite coordinate in {field}")]
    NonFiniteCoordinate { field: String },
}

/// What a world point lands on, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Symbol(EntityId),
    Orientation,
    /// Height readout of the well at this index.
    WellHeight(usize),
    /// Spacing readout between wells `i` and `i + 1`.
    Spacing(usize),
    Well(EntityId),
}

/// Persisted form of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentFile {
    wells: Vec<Well>,
    #[serde(default)]
    spacings: Vec<Spacing>,
    #[serde(default)]
    orientation: OrientationMarker,
    #[serde(default)]
    symbols: Vec<LibrarySymbol>,
}

/// The site layout document.
#[derive(Debug, Clone)]
pub struct SiteDocument {
    wells: Vec<Well>,
    spacings: Vec<Spacing>,
    orientation: OrientationMarker,
    symbols: Vec<LibrarySymbol>,
    selection: Option<EntityRef>,
    defaults: DocumentDefaults,
}

impl Default for SiteDocument {
    fn default() -> Self {
        Self::new(DocumentDefaults::default())
    }
}

impl SiteDocument {
    /// Create an empty document.
    pub fn new(defaults: DocumentDefaults) -> Self {
        Self {
            wells: Vec::new(),
            spacings: Vec::new(),
            orientation: OrientationMarker::default(),
            symbols: Vec::new(),
            selection: None,
            defaults,
        }
    }

    /// Create a document with `count` wells laid out in a row.
    pub fn with_well_count(count: usize, defaults: DocumentDefaults) -> Self {
        let mut doc = Self::new(defaults);
        for _ in 0..count {
            doc.add_well();
        }
        doc
    }

    /// Create a document from an explicit well list; spacings get defaults.
    pub fn from_wells(wells: Vec<Well>, defaults: DocumentDefaults) -> Self {
        let mut doc = Self::new(defaults);
        doc.wells = wells;
        doc.sync_spacings();
        doc
    }

    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    pub fn spacings(&self) -> &[Spacing] {
        &self.spacings
    }

    pub fn orientation(&self) -> &OrientationMarker {
        &self.orientation
    }

    pub fn symbols(&self) -> &[LibrarySymbol] {
        &self.symbols
    }

    pub fn defaults(&self) -> &DocumentDefaults {
        &self.defaults
    }

    pub fn well(&self, id: EntityId) -> Option<&Well> {
        self.wells.iter().find(|w| w.id == id)
    }

    pub fn well_index(&self, id: EntityId) -> Option<usize> {
        self.wells.iter().position(|w| w.id == id)
    }

    pub fn symbol(&self, id: EntityId) -> Option<&LibrarySymbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    fn symbol_mut(&mut self, id: EntityId) -> Option<&mut LibrarySymbol> {
        self.symbols.iter_mut().find(|s| s.id == id)
    }

    fn default_spacing(&self) -> Spacing {
        self.defaults.default_spacing
    }

    /// Truncate or pad spacings to one per adjacent well pair.
    /// Returns true if the list had to change length.
    fn sync_spacings(&mut self) -> bool {
        let expected = self.wells.len().saturating_sub(1);
        if self.spacings.len() == expected {
            return false;
        }
        let fill = self.default_spacing();
        self.spacings.resize(expected, fill);
        true
    }

    // --- Wells -----------------------------------------------------------

    fn next_well_name(&self) -> String {
        format!("Well {}", self.wells.len() + 1)
    }

    fn next_well_position(&self) -> Point {
        match self.wells.last() {
            Some(last) => Point::new(last.x + self.defaults.well_spacing_px, last.y),
            None => self.defaults.start_position,
        }
    }

    /// Append a well east of the last one (or at the start position).
    pub fn add_well(&mut self) -> EntityId {
        let well = Well::new(
            self.next_well_position(),
            self.next_well_name(),
            self.defaults.default_height,
            self.defaults.default_height_unit,
        );
        let id = well.id;
        self.wells.push(well);
        self.sync_spacings();
        log::info!("Added well {} ({} total)", id, self.wells.len());
        id
    }

    /// Remove the selected well, or the last well when no well is selected.
    /// Spacings are truncated from the end. No-op on an empty list.
    pub fn remove_well(&mut self) -> Option<Well> {
        let index = match self.selection {
            Some(EntityRef::Well(id)) => self.well_index(id),
            _ => None,
        }
        .or_else(|| self.wells.len().checked_sub(1))?;

        let removed = self.wells.remove(index);
        if self.selection == Some(EntityRef::Well(removed.id)) {
            self.selection = None;
        }
        self.spacings.pop();
        self.sync_spacings();
        log::info!("Removed well {} ({} left)", removed.name, self.wells.len());
        Some(removed)
    }

    /// Append a copy of the last well with a fresh name, offset east.
    /// No-op on an empty list.
    pub fn duplicate_well(&mut self) -> Option<EntityId> {
        let last = self.wells.last()?;
        let mut copy = last.clone();
        copy.id = uuid::Uuid::new_v4();
        copy.name = self.next_well_name();
        copy.set_position(self.next_well_position());
        let id = copy.id;
        self.wells.push(copy);
        self.sync_spacings();
        log::info!("Duplicated well into {}", id);
        Some(id)
    }

    /// Rename a well. Empty names are rejected.
    pub fn rename_well(&mut self, id: EntityId, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match self.wells.iter_mut().find(|w| w.id == id) {
            Some(well) => {
                well.name = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_well_height(&mut self, id: EntityId, value: f64, unit: LengthUnit) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.wells.iter_mut().find(|w| w.id == id) {
            Some(well) => {
                well.height_value = value;
                well.height_unit = unit;
                true
            }
            None => false,
        }
    }

    pub fn set_spacing(&mut self, index: usize, value: f64, unit: LengthUnit) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.spacings.get_mut(index) {
            Some(spacing) => {
                *spacing = Spacing::new(value, unit);
                true
            }
            None => false,
        }
    }

    pub fn move_well(&mut self, id: EntityId, position: Point) -> bool {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return false;
        }
        match self.wells.iter_mut().find(|w| w.id == id) {
            Some(well) => {
                well.set_position(position);
                true
            }
            None => false,
        }
    }

    /// World anchor of the spacing readout between wells `index` and `index + 1`.
    pub fn spacing_anchor(&self, index: usize) -> Option<Point> {
        let a = self.wells.get(index)?;
        let b = self.wells.get(index + 1)?;
        Some(Spacing::anchor_between(a.position(), b.position()))
    }

    // --- Orientation marker ----------------------------------------------

    pub fn rotate_orientation_marker(&mut self, angle_degrees: f64) {
        if angle_degrees.is_finite() {
            self.orientation.angle = crate::snap::normalize_degrees(angle_degrees);
        }
    }

    pub fn move_orientation_marker(&mut self, position: Point) {
        if position.x.is_finite() && position.y.is_finite() {
            self.orientation.x = position.x;
            self.orientation.y = position.y;
        }
    }

    // --- Library symbols -------------------------------------------------

    /// Place a symbol centered at `position` as a target-width square.
    /// The height is corrected by [`apply_symbol_natural_size`](Self::apply_symbol_natural_size)
    /// once the image dimensions are known.
    pub fn place_library_symbol(&mut self, key: &str, src: &str, position: Point) -> EntityId {
        let width = self.defaults.symbol_target_width;
        let symbol = LibrarySymbol::new(
            key,
            src,
            SymbolTransform {
                x: position.x,
                y: position.y,
                width,
                height: width,
                rotation: 0.0,
            },
        );
        let id = symbol.id;
        self.symbols.push(symbol);
        log::info!("Placed symbol {} ({})", key, id);
        id
    }

    /// Derive the symbol height from the image's natural size at the target
    /// width. Ignored if the symbol was deleted or the size is degenerate.
    pub fn apply_symbol_natural_size(&mut self, id: EntityId, natural_width: f64, natural_height: f64) -> bool {
        if !(natural_width > 0.0 && natural_height > 0.0) || !(natural_width * natural_height).is_finite() {
            return false;
        }
        let target = self.defaults.symbol_target_width;
        let Some(symbol) = self.symbol_mut(id) else {
            log::debug!("Image size arrived for removed symbol {}", id);
            return false;
        };
        symbol.transform.width = target;
        symbol.transform.height = target * natural_height / natural_width;
        true
    }

    /// Apply a handle transform, clamping width and height to the minimum size.
    pub fn transform_library_symbol(&mut self, id: EntityId, transform: SymbolTransform) -> bool {
        if !transform.is_finite() {
            return false;
        }
        let min = self.defaults.symbol_min_size;
        match self.symbol_mut(id) {
            Some(symbol) => {
                let mut t = transform.clamped(min);
                t.rotation = crate::snap::normalize_degrees(t.rotation);
                symbol.transform = t;
                true
            }
            None => false,
        }
    }

    pub fn move_library_symbol(&mut self, id: EntityId, position: Point) -> bool {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return false;
        }
        match self.symbol_mut(id) {
            Some(symbol) => {
                symbol.transform.x = position.x;
                symbol.transform.y = position.y;
                true
            }
            None => false,
        }
    }

    pub fn delete_library_symbol(&mut self, id: EntityId) -> Option<LibrarySymbol> {
        let index = self.symbols.iter().position(|s| s.id == id)?;
        if self.selection == Some(EntityRef::Symbol(id)) {
            self.selection = None;
        }
        Some(self.symbols.remove(index))
    }

    // --- Selection -------------------------------------------------------

    pub fn selection(&self) -> Option<EntityRef> {
        self.selection
    }

    pub fn is_selected(&self, entity: EntityRef) -> bool {
        self.selection == Some(entity)
    }

    /// Select one entity, clearing every other selection. Unknown ids are ignored.
    pub fn select(&mut self, entity: EntityRef) -> bool {
        let exists = match entity {
            EntityRef::Well(id) => self.well(id).is_some(),
            EntityRef::Symbol(id) => self.symbol(id).is_some(),
        };
        if exists {
            self.selection = Some(entity);
        }
        exists
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selected_symbol(&self) -> Option<&LibrarySymbol> {
        match self.selection {
            Some(EntityRef::Symbol(id)) => self.symbol(id),
            _ => None,
        }
    }

    // --- History ---------------------------------------------------------

    /// Undo is not implemented; always returns false.
    pub fn undo(&mut self) -> bool {
        log::debug!("Undo requested; history is not recorded");
        false
    }

    /// Redo is not implemented; always returns false.
    pub fn redo(&mut self) -> bool {
        log::debug!("Redo requested; history is not recorded");
        false
    }

    // --- Queries ---------------------------------------------------------

    /// Find the topmost entity or readout at `point`.
    ///
    /// Height readouts are always drawn and always hit. Spacing readouts are
    /// only drawn, and so only hit, when `labels` is true.
    pub fn hit_test(&self, point: Point, tolerance: f64, labels: bool) -> Option<HitTarget> {
        if let Some(symbol) = self.symbols.iter().rev().find(|s| s.hit_test(point, tolerance)) {
            return Some(HitTarget::Symbol(symbol.id));
        }
        if self.orientation.hit_test(point, tolerance) {
            return Some(HitTarget::Orientation);
        }
        if let Some(i) = self.wells.iter().rposition(|w| w.hit_test_height_label(point, tolerance)) {
            return Some(HitTarget::WellHeight(i));
        }
        if labels {
            let spacing_hit = (0..self.spacings.len()).rev().find(|&i| {
                self.spacing_anchor(i).is_some_and(|anchor| {
                    Rect::from_center_size(anchor, crate::entities::SPACING_LABEL_SIZE)
                        .inflate(tolerance, tolerance)
                        .contains(point)
                })
            });
            if let Some(i) = spacing_hit {
                return Some(HitTarget::Spacing(i));
            }
        }
        self.wells
            .iter()
            .rev()
            .find(|w| w.hit_test(point, tolerance))
            .map(|w| HitTarget::Well(w.id))
    }

    /// Bounding box of all content, if any.
    pub fn bounds(&self) -> Option<Rect> {
        let mut rects = self
            .wells
            .iter()
            .map(Well::bounds)
            .chain(self.symbols.iter().map(LibrarySymbol::bounds))
            .chain(std::iter::once(self.orientation.bounds()));
        let first = rects.next()?;
        Some(rects.fold(first, |acc, r| acc.union(r)))
    }

    // --- Serialization ---------------------------------------------------

    /// Serialize the persisted state (no viewport, tool or selection).
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let file = DocumentFile {
            wells: self.wells.clone(),
            spacings: self.spacings.clone(),
            orientation: self.orientation,
            symbols: self.symbols.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parse a document, repairing a spacing count that does not match the
    /// well count. Repairs are reported as warnings.
    pub fn from_json(json: &str, defaults: DocumentDefaults) -> Result<(Self, Vec<String>), DocumentError> {
        let file: DocumentFile = serde_json::from_str(json)?;
        let mut warnings = Vec::new();

        for (i, well) in file.wells.iter().enumerate() {
            if !(well.x.is_finite() && well.y.is_finite() && well.height_value.is_finite()) {
                return Err(DocumentError::NonFiniteCoordinate { field: format!("wells[{i}]") });
            }
        }
        for (i, spacing) in file.spacings.iter().enumerate() {
            if !spacing.value.is_finite() {
                return Err(DocumentError::NonFiniteCoordinate { field: format!("spacings[{i}]") });
            }
        }
        let o = &file.orientation;
        if !(o.x.is_finite() && o.y.is_finite() && o.angle.is_finite()) {
            return Err(DocumentError::NonFiniteCoordinate { field: "orientation".to_string() });
        }

        let mut symbols = Vec::with_capacity(file.symbols.len());
        for symbol in file.symbols {
            if symbol.transform.is_finite() {
                let mut symbol = symbol;
                symbol.transform = symbol.transform.clamped(defaults.symbol_min_size);
                symbols.push(symbol);
            } else {
                warnings.push(format!("Dropped symbol '{}' with invalid geometry", symbol.key));
            }
        }

        let expected = file.wells.len().saturating_sub(1);
        let found = file.spacings.len();

        let mut doc = Self::new(defaults);
        doc.wells = file.wells;
        doc.spacings = file.spacings;
        doc.orientation = file.orientation;
        doc.symbols = symbols;
        if doc.sync_spacings() {
            warnings.push(format!(
                "Document had {found} spacings for {} wells; repaired to {expected}",
                doc.wells.len()
            ));
        }
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        Ok((doc, warnings))
    }

    /// Import a document, falling back to an empty document on failure.
    pub fn import_or_default(json: &str, defaults: DocumentDefaults) -> (Self, Vec<String>) {
        match Self::from_json(json, defaults.clone()) {
            Ok(result) => result,
            Err(e) => {
                let warning = format!("Import failed, starting from an empty layout: {e}");
                log::warn!("{}", warning);
                (Self::new(defaults), vec![warning])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(count: usize) -> SiteDocument {
        SiteDocument::with_well_count(count, DocumentDefaults::default())
    }

    fn assert_parity(doc: &SiteDocument) {
        assert_eq!(doc.spacings().len(), doc.wells().len().saturating_sub(1));
    }

    #[test]
    fn test_add_well_positions_east() {
        let mut d = doc(0);
        d.add_well();
        d.add_well();
        assert_eq!(d.wells()[0].position(), Point::new(100.0, 200.0));
        assert_eq!(d.wells()[1].position(), Point::new(220.0, 200.0));
        assert_eq!(d.wells()[1].name, "Well 2");
        assert_eq!(d.spacings(), &[Spacing::new(20.0, LengthUnit::Feet)]);
    }

    #[test]
    fn test_spacing_parity_under_mixed_operations() {
        let mut d = doc(0);
        // Deterministic pseudo-random sequence of operations.
        let mut state = 0x2545_f491_u32;
        for _ in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            match state % 4 {
                0 => {
                    d.add_well();
                }
                1 => {
                    d.remove_well();
                }
                2 => {
                    d.duplicate_well();
                }
                _ => {
                    if let Some(id) = d.wells().first().map(Well::id) {
                        d.select(EntityRef::Well(id));
                    }
                }
            }
            assert_parity(&d);
        }
    }

    #[test]
    fn test_remove_past_empty_is_noop() {
        let mut d = doc(4);
        for _ in 0..4 {
            assert!(d.remove_well().is_some());
        }
        assert!(d.remove_well().is_none());
        assert!(d.wells().is_empty());
        assert!(d.spacings().is_empty());
    }

    #[test]
    fn test_remove_prefers_selected_well() {
        let mut d = doc(3);
        let middle = d.wells()[1].id();
        d.select(EntityRef::Well(middle));
        let removed = d.remove_well().map(|w| w.id());
        assert_eq!(removed, Some(middle));
        assert_eq!(d.selection(), None);
        assert_parity(&d);
    }

    #[test]
    fn test_remove_truncates_spacings_from_end() {
        let mut d = doc(3);
        d.set_spacing(0, 5.0, LengthUnit::Meters);
        d.set_spacing(1, 9.0, LengthUnit::Meters);
        let first = d.wells()[0].id();
        d.select(EntityRef::Well(first));
        d.remove_well();
        assert_eq!(d.spacings(), &[Spacing::new(5.0, LengthUnit::Meters)]);
    }

    #[test]
    fn test_duplicate_copies_height_and_renames() {
        let mut d = doc(2);
        let last = d.wells()[1].id();
        d.set_well_height(last, 36.0, LengthUnit::Inches);
        let id = d.duplicate_well();
        assert!(id.is_some());
        let copy = &d.wells()[2];
        assert_eq!(copy.name, "Well 3");
        assert!((copy.height_value - 36.0).abs() < f64::EPSILON);
        assert!((copy.x - (d.wells()[1].x + 120.0)).abs() < f64::EPSILON);
        assert_ne!(Some(d.wells()[1].id()), id);
    }

    #[test]
    fn test_duplicate_empty_is_noop() {
        let mut d = doc(0);
        assert!(d.duplicate_well().is_none());
        assert_parity(&d);
    }

    #[test]
    fn test_single_selection_across_types() {
        let mut d = doc(2);
        let well = d.wells()[0].id();
        let symbol = d.place_library_symbol("tank", "tank.png", Point::new(0.0, 0.0));

        d.select(EntityRef::Well(well));
        assert!(d.is_selected(EntityRef::Well(well)));
        d.select(EntityRef::Symbol(symbol));
        assert!(d.is_selected(EntityRef::Symbol(symbol)));
        assert!(!d.is_selected(EntityRef::Well(well)));

        assert!(!d.select(EntityRef::Well(uuid::Uuid::new_v4())));
        assert!(d.is_selected(EntityRef::Symbol(symbol)));

        d.clear_selection();
        assert_eq!(d.selection(), None);
    }

    #[test]
    fn test_symbol_aspect_ratio_from_natural_size() {
        let mut d = doc(0);
        let id = d.place_library_symbol("pump", "pump.png", Point::new(10.0, 10.0));
        assert!(d.apply_symbol_natural_size(id, 200.0, 100.0));
        let t = d.symbol(id).map(|s| s.transform);
        assert_eq!(t.map(|t| t.width), Some(160.0));
        assert_eq!(t.map(|t| t.height), Some(80.0));
    }

    #[test]
    fn test_natural_size_after_delete_is_ignored() {
        let mut d = doc(0);
        let id = d.place_library_symbol("pump", "pump.png", Point::new(10.0, 10.0));
        d.delete_library_symbol(id);
        assert!(!d.apply_symbol_natural_size(id, 200.0, 100.0));
        assert!(d.symbols().is_empty());
    }

    #[test]
    fn test_transform_clamps_minimum_size() {
        let mut d = doc(0);
        let id = d.place_library_symbol("pump", "pump.png", Point::ZERO);
        let ok = d.transform_library_symbol(
            id,
            SymbolTransform { x: 1.0, y: 2.0, width: 4.0, height: -10.0, rotation: 370.0 },
        );
        assert!(ok);
        let t = d.symbol(id).map(|s| s.transform);
        assert_eq!(t.map(|t| (t.width, t.height)), Some((32.0, 32.0)));
        assert!(t.is_some_and(|t| (t.rotation - 10.0).abs() < 1e-9));
    }

    #[test]
    fn test_edits_reject_non_finite() {
        let mut d = doc(2);
        let id = d.wells()[0].id();
        assert!(!d.set_well_height(id, f64::NAN, LengthUnit::Feet));
        assert!(!d.set_spacing(0, f64::INFINITY, LengthUnit::Feet));
        assert!(!d.set_spacing(5, 1.0, LengthUnit::Feet));
        assert!(!d.rename_well(id, "   "));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut d = doc(3);
        let id = d.wells()[1].id();
        d.rename_well(id, "Pad B");
        d.set_well_height(id, 36.0, LengthUnit::Inches);
        d.set_spacing(1, 7.5, LengthUnit::Meters);
        d.rotate_orientation_marker(45.0);
        d.move_orientation_marker(Point::new(400.0, 80.0));
        d.place_library_symbol("tank", "tank.png", Point::new(300.0, 300.0));

        let json = d.to_json().unwrap();
        let (back, warnings) = SiteDocument::from_json(&json, DocumentDefaults::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(back.to_json().unwrap(), json);
        assert_eq!(back.wells()[1].name, "Pad B");
        assert_eq!(back.spacings()[1], Spacing::new(7.5, LengthUnit::Meters));
        assert_eq!(back.orientation(), d.orientation());
    }

    #[test]
    fn test_json_shape() {
        let d = doc(2);
        let value: serde_json::Value = serde_json::from_str(&d.to_json().unwrap()).unwrap();
        assert!(value["wells"][0]["heightUnit"].is_string());
        assert_eq!(value["spacings"][0]["unit"], "ft");
        assert!(value["orientation"]["angle"].is_number());
    }

    #[test]
    fn test_import_repairs_spacing_count() {
        let json = r#"{
            "wells": [
                {"x": 0, "y": 0, "name": "A", "heightValue": 0, "heightUnit": "in"},
                {"x": 100, "y": 0, "name": "B", "heightValue": 0, "heightUnit": "in"},
                {"x": 200, "y": 0, "name": "C", "heightValue": 0, "heightUnit": "in"}
            ],
            "spacings": [{"value": 10, "unit": "ft"}],
            "orientation": {"x": 0, "y": 0, "angle": 90}
        }"#;
        let (d, warnings) = SiteDocument::from_json(json, DocumentDefaults::default()).unwrap();
        assert_eq!(d.spacings().len(), 2);
        assert_eq!(d.spacings()[0], Spacing::new(10.0, LengthUnit::Feet));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_import_truncates_extra_spacings() {
        let json = r#"{
            "wells": [{"x": 0, "y": 0, "name": "A", "heightValue": 0, "heightUnit": "in"}],
            "spacings": [{"value": 10, "unit": "ft"}, {"value": 11, "unit": "ft"}],
            "orientation": {"x": 0, "y": 0, "angle": 0}
        }"#;
        let (d, warnings) = SiteDocument::from_json(json, DocumentDefaults::default()).unwrap();
        assert!(d.spacings().is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_import_invalid_falls_back() {
        let (d, warnings) = SiteDocument::import_or_default("{not json", DocumentDefaults::default());
        assert!(d.wells().is_empty());
        assert_eq!(warnings.len(), 1);

        assert!(matches!(
            SiteDocument::from_json(r#"{"wells": "nope"}"#, DocumentDefaults::default()),
            Err(DocumentError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_hit_test_order() {
        let mut d = doc(2);
        let first = d.wells()[0].clone();
        assert_eq!(d.hit_test(first.position(), 0.0, true), Some(HitTarget::Well(first.id())));
        assert_eq!(d.hit_test(first.height_anchor(), 0.0, true), Some(HitTarget::WellHeight(0)));

        let anchor = d.spacing_anchor(0).unwrap();
        assert_eq!(d.hit_test(anchor, 0.0, true), Some(HitTarget::Spacing(0)));

        let symbol = d.place_library_symbol("tank", "tank.png", first.position());
        assert_eq!(d.hit_test(first.position(), 0.0, true), Some(HitTarget::Symbol(symbol)));
    }

    #[test]
    fn test_hit_test_without_labels() {
        let d = doc(2);
        let second = d.wells()[1].clone();
        assert_eq!(d.hit_test(second.height_anchor(), 0.0, false), Some(HitTarget::WellHeight(1)));

        let anchor = d.spacing_anchor(0).unwrap();
        assert_eq!(d.hit_test(anchor, 0.0, false), None);
    }

    #[test]
    fn test_undo_redo_are_noops() {
        let mut d = doc(2);
        assert!(!d.undo());
        assert!(!d.redo());
        assert_eq!(d.wells().len(), 2);
    }
}
