// Query building
// Maps a lab panel into a natural-language retrieval query and the set of
// guideline corpora worth searching. Threshold rules are evaluated
// independently per lab field; within a field the higher-severity phrase
// wins.

use itertools::Itertools;

use crate::guideline::GuidelineTag;
use crate::recommend::LabPanel;

/// Fallback query when no threshold triggers.
pub const GENERAL_QUERY: &str = "general healthy eating guidelines";

/// Build the retrieval query for a lab panel.
#[inline]
pub fn build_query(panel: &LabPanel) -> String {
    let mut conditions: Vec<&str> = Vec::new();

    if let Some(glucose) = panel.glucose_fasting {
        if glucose >= 126.0 {
            conditions.push("diabetic blood glucose management diet");
        } else if glucose >= 100.0 {
            conditions.push("prediabetes blood sugar control nutrition");
        }
    }

    if let Some(a1c) = panel.a1c {
        if a1c >= 6.5 {
            conditions.push("diabetes A1C dietary management");
        } else if a1c >= 5.7 {
            conditions.push("prediabetes A1C prevention diet");
        }
    }

    if panel.total_cholesterol.is_some_and(|v| v >= 200.0) {
        conditions.push("high cholesterol heart healthy diet");
    }

    if panel.ldl.is_some_and(|v| v >= 130.0) {
        conditions.push("LDL cholesterol reduction dietary guidelines");
    }

    if panel.hdl.is_some_and(|v| v < 40.0) {
        conditions.push("increase HDL cholesterol nutrition");
    }

    if panel.triglycerides.is_some_and(|v| v >= 150.0) {
        conditions.push("lower triglycerides diet recommendations");
    }

    let bp_stage_two = panel.systolic_bp.is_some_and(|v| v >= 140.0)
        || panel.diastolic_bp.is_some_and(|v| v >= 90.0);
    let bp_elevated = panel.systolic_bp.is_some_and(|v| v >= 120.0)
        || panel.diastolic_bp.is_some_and(|v| v >= 80.0);
    if bp_stage_two {
        conditions.push("hypertension DASH diet blood pressure");
    } else if bp_elevated {
        conditions.push("elevated blood pressure dietary changes");
    }

    if let Some(bmi) = panel.bmi {
        if bmi >= 30.0 {
            conditions.push("obesity weight management nutrition plan");
        } else if bmi >= 25.0 {
            conditions.push("overweight healthy weight loss diet");
        }
    }

    if conditions.is_empty() {
        GENERAL_QUERY.to_string()
    } else {
        conditions.join(" ")
    }
}

/// Guideline corpora relevant to the panel's present fields, in trigger
/// order with duplicates removed. Falls back to GENERAL when nothing
/// triggers, so the result is never empty.
#[inline]
pub fn relevant_guidelines(panel: &LabPanel) -> Vec<GuidelineTag> {
    let mut guidelines = Vec::new();

    if panel.glucose_fasting.is_some() || panel.a1c.is_some() {
        guidelines.push(GuidelineTag::Ada);
    }

    if panel.total_cholesterol.is_some()
        || panel.ldl.is_some()
        || panel.hdl.is_some()
        || panel.triglycerides.is_some()
    {
        guidelines.extend([GuidelineTag::Aha, GuidelineTag::Lipid]);
    }

    if panel.systolic_bp.is_some() || panel.diastolic_bp.is_some() {
        guidelines.extend([GuidelineTag::Dash, GuidelineTag::Aha]);
    }

    let guidelines: Vec<GuidelineTag> = guidelines.into_iter().unique().collect();

    if guidelines.is_empty() {
        vec![GuidelineTag::General]
    } else {
        guidelines
    }
}
