use crate::domain::element::{CriticalElement, Importance};
use crate::domain::issue::{Issue, IssueKind};

/// High-importance elements below this mean attention are flagged.
pub const UNDER_ATTENDED: f64 = 0.5;
/// Medium-importance elements above this mean attention are flagged.
pub const OVER_ATTENDED:  f64 = 0.8;

/// Compare each element's importance with the attention it gets.
pub fn verify_attention_priority(elements: &[CriticalElement]) -> Vec<Issue> {
    elements
        .iter()
        .filter_map(|el| {
            let attention = el.attention_score;
            match el.importance {
                Importance::High if attention < UNDER_ATTENDED => {
                    Some(IssueKind::LowAttentionToCriticalElement {
                        element_id:   el.id.clone(),
                        element_type: el.element_type,
                        attention,
                    })
                }
                Importance::Medium if attention > OVER_ATTENDED => {
                    Some(IssueKind::ExcessiveAttentionToSecondaryElement {
                        element_id:   el.id.clone(),
                        element_type: el.element_type,
                        attention,
                    })
                }
                _ => None,
            }
        })
        .map(Issue::new)
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::{ElementType, Region};
    use crate::domain::issue::{Severity, Subcategory};

    fn element(id: &str, importance: Importance, attention: f64) -> CriticalElement {
        CriticalElement {
            id:              id.to_string(),
            element_type:    ElementType::ButtonCta,
            location:        Region::new(0, 0, 120, 40),
            importance,
            attention_score: attention,
            max_attention:   attention,
            area:            4800,
            is_top:          importance == Importance::High,
            is_large:        false,
            is_centered:     false,
        }
    }

    #[test]
    fn test_under_attended_critical_element() {
        let issues = verify_attention_priority(&[element("element_0", Importance::High, 0.3)]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].subcategory, Subcategory::PriorityMismatch);
        assert_eq!(issues[0].confidence, 0.80);
    }

    #[test]
    fn test_over_attended_secondary_element() {
        let issues = verify_attention_priority(&[element("element_1", Importance::Medium, 0.85)]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(issues[0].id, "attention_overemphasis_element_1");
    }

    #[test]
    fn test_well_balanced_elements_raise_nothing() {
        let issues = verify_attention_priority(&[
            element("a", Importance::High, 0.5),
            element("b", Importance::Medium, 0.8),
            element("c", Importance::High, 0.95),
            element("d", Importance::Medium, 0.1),
        ]);
        assert!(issues.is_empty());
    }
}
