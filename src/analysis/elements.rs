use crate::domain::element::{CriticalElement, ElementType, Importance, Region};
use crate::domain::report::rounded;
use crate::domain::saliency_map::SaliencyMap;

/// Only the first contours are considered; later ones are mostly
/// fragments of text and texture.
pub const MAX_CONTOURS:        usize = 30;
pub const MAX_ELEMENTS:        usize = 10;
pub const MIN_ELEMENT_AREA:    u64   = 1_000;
pub const MAX_ELEMENT_AREA:    u64   = 50_000;
pub const LARGE_ELEMENT_AREA:  u64   = 10_000;
pub const TOP_FRACTION:        f64   = 0.3;
pub const CENTERED_TOLERANCE:  f64   = 0.2;

/// Aspect-ratio and position rules, first match wins.
pub fn classify_element_type(region: &Region, is_top: bool) -> ElementType {
    let ar = region.aspect_ratio();
    if is_top && region.width as u64 > region.height as u64 * 3 {
        ElementType::HeaderNavigation
    } else if ar > 2.0 && ar < 5.0 && region.height < 60 {
        ElementType::ButtonCta
    } else if ar < 1.5 && region.width < 100 {
        ElementType::Icon
    } else if ar > 3.0 {
        ElementType::TextBlock
    } else {
        ElementType::UiElement
    }
}

/// Score one contour box. Boxes outside the UI-element size band
/// give None.
pub fn element_from_region(
    index:  usize,
    region: Region,
    map:    &SaliencyMap,
) -> Option<CriticalElement> {
    let area = region.area();
    if area <= MIN_ELEMENT_AREA || area >= MAX_ELEMENT_AREA {
        return None;
    }

    let (w, h) = (map.width() as f64, map.height() as f64);
    let is_top      = (region.y as f64) < h * TOP_FRACTION;
    let is_large    = area > LARGE_ELEMENT_AREA;
    let is_centered = (region.center_x() - w / 2.0).abs() < w * CENTERED_TOLERANCE;

    let importance = if is_top || is_large || is_centered {
        Importance::High
    } else {
        Importance::Medium
    };

    let (mean, max) = map.region_stats(&region);

    Some(CriticalElement {
        id:              format!("element_{index}"),
        element_type:    classify_element_type(&region, is_top),
        location:        region,
        importance,
        attention_score: rounded(mean, 3),
        max_attention:   rounded(max, 3),
        area,
        is_top,
        is_large,
        is_centered,
    })
}

/// Critical elements from contour boxes, high importance first,
/// then by attention, capped at ten.
pub fn detect_critical_elements(boxes: &[Region], map: &SaliencyMap) -> Vec<CriticalElement> {
    let mut elements: Vec<CriticalElement> = boxes
        .iter()
        .take(MAX_CONTOURS)
        .enumerate()
        .filter_map(|(i, region)| element_from_region(i, *region, map))
        .collect();

    elements.sort_by(|a, b| {
        b.importance
            .cmp(&a.importance)
            .then(b.attention_score.total_cmp(&a.attention_score))
    });
    elements.truncate(MAX_ELEMENTS);

    tracing::debug!("{} critical elements from {} contours", elements.len(), boxes.len());
    elements
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn flat_map(w: u32, h: u32, v: f32) -> SaliencyMap {
        SaliencyMap::from_fn(w, h, |_, _| v)
    }

    #[test]
    fn test_element_near_top_of_600px_image_is_top() {
        let map = flat_map(800, 600, 0.4);
        let el  = element_from_region(0, Region::new(20, 50, 60, 30), &map).unwrap();
        assert!(el.is_top);
        assert_eq!(el.importance, Importance::High);
    }

    #[test]
    fn test_out_of_band_areas_are_rejected() {
        let map = flat_map(800, 600, 0.4);
        assert!(element_from_region(0, Region::new(0, 0, 10, 10), &map).is_none());
        assert!(element_from_region(0, Region::new(0, 0, 500, 200), &map).is_none());
    }

    #[test]
    fn test_bottom_corner_small_element_is_medium() {
        let map = flat_map(1000, 1000, 0.4);
        let el  = element_from_region(4, Region::new(10, 900, 40, 40), &map).unwrap();
        assert!(!el.is_top && !el.is_large && !el.is_centered);
        assert_eq!(el.importance, Importance::Medium);
        assert_eq!(el.id, "element_4");
    }

    #[test]
    fn test_classification_rules() {
        assert_eq!(classify_element_type(&Region::new(0, 0, 400, 50), true), ElementType::HeaderNavigation);
        assert_eq!(classify_element_type(&Region::new(0, 0, 120, 40), false), ElementType::ButtonCta);
        assert_eq!(classify_element_type(&Region::new(0, 0, 40, 40), false), ElementType::Icon);
        assert_eq!(classify_element_type(&Region::new(0, 0, 400, 80), false), ElementType::TextBlock);
        assert_eq!(classify_element_type(&Region::new(0, 0, 200, 150), false), ElementType::UiElement);
    }

    #[test]
    fn test_sorted_high_first_then_by_attention() {
        let map = SaliencyMap::from_fn(1000, 1000, |x, _| if x < 500 { 0.2 } else { 0.9 });
        let boxes = vec![
            Region::new(10, 900, 40, 40),   // medium, 0.2
            Region::new(850, 900, 40, 40),  // medium, 0.9
            Region::new(10, 10, 40, 40),    // high (top), 0.2
        ];
        let els = detect_critical_elements(&boxes, &map);
        let ids: Vec<&str> = els.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["element_2", "element_1", "element_0"]);
    }

    #[test]
    fn test_no_contours_no_elements() {
        assert!(detect_critical_elements(&[], &flat_map(10, 10, 0.0)).is_empty());
    }
}
