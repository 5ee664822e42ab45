use serde::{Deserialize, Serialize};

use crate::constants::round1;
use crate::controls::{HierarchyShape, group_by_hierarchy};
use crate::evaluator::ControlEvaluation;

/// Leaf group (subdomain or category) with its evaluated controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureLeaf {
    pub id: String,
    pub name: String,
    pub avg_score: f64,
    pub controls: Vec<ControlEvaluation>,
}

/// Parent group (domain or function) rolled up over all controls beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureGroup {
    pub id: String,
    pub name: String,
    pub avg_score: f64,
    pub control_count: usize,
    pub children: Vec<StructureLeaf>,
}

/// Evaluations of one framework arranged along its hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkStructure {
    pub shape: HierarchyShape,
    pub groups: Vec<StructureGroup>,
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        round1(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Groups evaluations by their metadata. Deterministic: groups appear in
/// first-encounter order and controls keep their input order.
pub fn build_structure(framework: &str, controls: &[ControlEvaluation]) -> FrameworkStructure {
    let shape = HierarchyShape::for_framework(framework);

    let groups = group_by_hierarchy(controls.iter().cloned(), shape, |c| &c.control_meta)
        .into_iter()
        .map(|parent| {
            let all_scores: Vec<f64> = parent.items().map(|c| c.final_score).collect();
            let avg_score = mean(&all_scores);
            let control_count = all_scores.len();

            let children = parent
                .children
                .into_iter()
                .map(|leaf| {
                    let scores: Vec<f64> = leaf.items.iter().map(|c| c.final_score).collect();
                    StructureLeaf {
                        id: leaf.id,
                        name: leaf.name,
                        avg_score: mean(&scores),
                        controls: leaf.items,
                    }
                })
                .collect();

            StructureGroup {
                id: parent.id,
                name: parent.name,
                avg_score,
                control_count,
                children,
            }
        })
        .collect();

    FrameworkStructure { shape, groups }
}
