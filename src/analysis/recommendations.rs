use crate::domain::issue::{Issue, Subcategory};
use crate::domain::report::{CognitiveLoadLevel, Priority, Recommendation};

/// One recommendation per issue family that fired. Over-emphasis
/// issues are advisory only and produce no recommendation.
pub fn generate_recommendations(issues: &[Issue], load_level: CognitiveLoadLevel) -> Vec<Recommendation> {
    let count = |sub: Subcategory| issues.iter().filter(|i| i.subcategory == sub).count();
    let mut recommendations = Vec::new();

    let mismatches = count(Subcategory::PriorityMismatch);
    if mismatches > 0 {
        recommendations.push(Recommendation {
            category:    "Attention Priority".into(),
            priority:    Priority::High,
            title:       "Emphasize Critical Elements".into(),
            description: format!("Found {mismatches} critical elements not receiving enough attention"),
            action:      "Increase size, contrast, or use color to make important elements more prominent".into(),
            impact:      "Ensures users notice and interact with key features".into(),
            resources:   vec!["https://www.nngroup.com/articles/visual-hierarchy/".into()],
        });
    }

    if count(Subcategory::VisualHierarchy) > 0 {
        recommendations.push(Recommendation {
            category:    "Visual Hierarchy".into(),
            priority:    Priority::High,
            title:       "Improve Visual Hierarchy".into(),
            description: "Strengthen visual hierarchy to guide user attention".into(),
            action:      "Use size, color, and positioning to create clear information hierarchy".into(),
            impact:      "Helps users quickly understand content structure and importance".into(),
            resources:   vec!["https://www.interaction-design.org/literature/article/visual-hierarchy".into()],
        });
    }

    if count(Subcategory::CognitiveLoad) > 0 {
        let priority = match load_level {
            CognitiveLoadLevel::High | CognitiveLoadLevel::VeryHigh => Priority::High,
            CognitiveLoadLevel::Low | CognitiveLoadLevel::Moderate  => Priority::Medium,
        };
        recommendations.push(Recommendation {
            category:    "Cognitive Load".into(),
            priority,
            title:       "Reduce Cognitive Load".into(),
            description: format!("Current cognitive load: {}", load_level.description()),
            action:      "Simplify design by reducing elements, colors, and visual complexity".into(),
            impact:      "Improves user comprehension and task completion rates".into(),
            resources:   vec![
                "https://www.nngroup.com/articles/minimize-cognitive-load/".into(),
                "https://lawsofux.com/millers-law/".into(),
            ],
        });
    }

    recommendations
}
