use super::*;

#[test]
fn classify_by_keyword() {
    assert_eq!(
        classify_path("/docs/aha_heart_failure_2022.pdf"),
        GuidelineTag::Aha
    );
    assert_eq!(
        classify_path("/docs/ada-standards-of-care.pdf"),
        GuidelineTag::Ada
    );
    assert_eq!(classify_path("/docs/diabetes_diet.txt"), GuidelineTag::Ada);
    assert_eq!(classify_path("/docs/dash_eating_plan.md"), GuidelineTag::Dash);
    assert_eq!(
        classify_path("/docs/lipid_management.docx"),
        GuidelineTag::Lipid
    );
    assert_eq!(
        classify_path("/docs/cholesterol_basics.txt"),
        GuidelineTag::Lipid
    );
}

#[test]
fn classify_is_case_insensitive() {
    assert_eq!(classify_path("/Docs/DASH-Plan.PDF"), GuidelineTag::Dash);
    assert_eq!(classify_path("/docs/Heart-Health.md"), GuidelineTag::Aha);
}

#[test]
fn classify_matches_directories_too() {
    // The whole path participates in the match, not just the filename.
    assert_eq!(
        classify_path("/guidelines/diabetes/meal_planning.txt"),
        GuidelineTag::Ada
    );
}

#[test]
fn first_rule_wins() {
    // "heart"/"aha" is evaluated before "dash", so a path mentioning both is
    // tagged AHA.
    assert_eq!(
        classify_path("/docs/dash_for_heart_patients.pdf"),
        GuidelineTag::Aha
    );
    // "diabetes" before "cholesterol".
    assert_eq!(
        classify_path("/docs/diabetes_and_cholesterol.md"),
        GuidelineTag::Ada
    );
}

#[test]
fn unmatched_paths_are_general() {
    assert_eq!(
        classify_path("/docs/dietary_fiber_overview.pdf"),
        GuidelineTag::General
    );
    assert_eq!(classify_path(""), GuidelineTag::General);
}

#[test]
fn wire_names_are_uppercase() {
    // The serialized form is what lands in vector payloads and what the
    // retrieval filter matches against, so both must agree with as_str().
    for tag in [
        GuidelineTag::Ada,
        GuidelineTag::Aha,
        GuidelineTag::Dash,
        GuidelineTag::Lipid,
        GuidelineTag::General,
    ] {
        let json = serde_json::to_string(&tag).expect("tag should serialize");
        assert_eq!(json, format!("\"{}\"", tag.as_str()));

        let back: GuidelineTag = serde_json::from_str(&json).expect("tag should deserialize");
        assert_eq!(back, tag);
    }
}
