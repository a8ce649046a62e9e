// Prompt assembly
// Deterministic composition of the generation prompt: lab-value summary,
// retrieved passages in ranked order, then a fixed instruction block.

use itertools::Itertools;

use crate::recommend::{LabPanel, RetrievedContext};

/// Delimiter between retrieved passages.
const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Render one line per present lab value, with fixed labels and units.
#[inline]
pub fn lab_summary(panel: &LabPanel) -> String {
    let mut lines = Vec::new();

    if let Some(v) = panel.glucose_fasting {
        lines.push(format!("Fasting Glucose: {} mg/dL", v));
    }
    if let Some(v) = panel.a1c {
        lines.push(format!("A1C: {}%", v));
    }
    if let Some(v) = panel.total_cholesterol {
        lines.push(format!("Total Cholesterol: {} mg/dL", v));
    }
    if let Some(v) = panel.ldl {
        lines.push(format!("LDL: {} mg/dL", v));
    }
    if let Some(v) = panel.hdl {
        lines.push(format!("HDL: {} mg/dL", v));
    }
    if let Some(v) = panel.triglycerides {
        lines.push(format!("Triglycerides: {} mg/dL", v));
    }
    match (panel.systolic_bp, panel.diastolic_bp) {
        (Some(systolic), Some(diastolic)) => {
            lines.push(format!("Blood Pressure: {}/{} mmHg", systolic, diastolic));
        }
        (Some(systolic), None) => {
            lines.push(format!("Systolic Blood Pressure: {} mmHg", systolic));
        }
        (None, Some(diastolic)) => {
            lines.push(format!("Diastolic Blood Pressure: {} mmHg", diastolic));
        }
        (None, None) => {}
    }
    if let Some(v) = panel.bmi {
        lines.push(format!("BMI: {}", v));
    }
    if let Some(v) = panel.egfr {
        lines.push(format!("eGFR: {} mL/min/1.73m2", v));
    }

    lines.join("\n")
}

/// Assemble the full generation prompt. Contexts may legitimately be
/// empty; the guidelines section then renders empty.
#[inline]
pub fn build_prompt(panel: &LabPanel, contexts: &[RetrievedContext]) -> String {
    let context_text = contexts
        .iter()
        .map(|ctx| format!("[{}] {}", ctx.guideline, ctx.content))
        .join(CONTEXT_DELIMITER);

    format!(
        "You are a nutrition advisor providing evidence-based dietary recommendations.

Based on the following lab results and clinical guidelines, provide personalized nutrition recommendations.

## Patient Lab Results
{}

## Clinical Guidelines Reference
{}

## Instructions
1. Analyze the lab results and identify areas of concern
2. Provide specific, actionable nutrition recommendations based on the clinical guidelines
3. Include daily targets for key nutrients where applicable
4. Suggest specific foods to include and limit
5. Be encouraging but honest about the importance of dietary changes

Provide your recommendations in a clear, organized format.",
        lab_summary(panel),
        context_text
    )
}
