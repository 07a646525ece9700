use storyloom::template::{blank_bindings, fill_template};
use storyloom::{Bindings, PromptTemplate, compile_instruction, extract_placeholders};

fn bindings(pairs: &[(&str, &str)]) -> Bindings {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const PREAMBLE_END: &str = "Follow these instructions and template:\n";

#[test]
fn test_extract_collapses_duplicates_in_first_occurrence_order() {
    assert_eq!(
        extract_placeholders("{{a}} and {{b}} and {{a}}"),
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(
        extract_placeholders("{{zeta}} {{alpha}} {{zeta}} {{mid}}"),
        vec!["zeta", "alpha", "mid"]
    );
}

#[test]
fn test_extract_tolerates_whitespace_inside_markers() {
    assert_eq!(
        extract_placeholders("{{ hero }} meets {{villain}} and {{  hero}}"),
        vec!["hero", "villain"]
    );
}

#[test]
fn test_extract_ignores_non_markers() {
    assert!(extract_placeholders("").is_empty());
    assert!(extract_placeholders("no markers here").is_empty());
    assert!(extract_placeholders("{single} {{ }} {{two words}} {{-dash}}").is_empty());
}

#[test]
fn test_non_ascii_markers_stay_literal() {
    assert_eq!(
        extract_placeholders("{{主题}} and {{café}} and {{topic}}"),
        vec!["topic"]
    );

    let filled = fill_template(
        "{{主题}}, {{café}}, {{topic}}",
        &bindings(&[("主题", "x"), ("café", "y"), ("topic", "z")]),
    );
    assert_eq!(filled, "{{主题}}, {{café}}, z");

    let instruction = compile_instruction("Hero: {{héros}}", &Bindings::new(), "t");
    assert!(instruction.ends_with("Hero: {{héros}}"));
}

#[test]
fn test_unbound_marker_becomes_empty() {
    let instruction = compile_instruction("Hero: {{hero}}", &Bindings::new(), "courage");
    assert!(instruction.ends_with(&format!("{PREAMBLE_END}Hero: ")));
}

#[test]
fn test_every_occurrence_is_replaced() {
    let filled = fill_template(
        "{{name}} walks. {{ name }} stops. {{name}}!",
        &bindings(&[("name", "Ada")]),
    );
    assert_eq!(filled, "Ada walks. Ada stops. Ada!");
}

#[test]
fn test_values_are_inserted_literally() {
    let filled = fill_template(
        "Cost: {{price}}, next: {{next}}",
        &bindings(&[("price", "$1 and ${next}"), ("next", "{{price}}")]),
    );
    assert_eq!(filled, "Cost: $1 and ${next}, next: {{price}}");
}

#[test]
fn test_extra_bindings_are_ignored() {
    let filled = fill_template("Only {{one}}", &bindings(&[("one", "1"), ("two", "2")]));
    assert_eq!(filled, "Only 1");
}

#[test]
fn test_compilation_is_deterministic() {
    let content = "Write about {{topic}} in {{setting}} with {{mood}}.";
    let values = bindings(&[("topic", "whales"), ("setting", "the arctic")]);
    let first = compile_instruction(content, &values, "migration");
    for _ in 0..10 {
        assert_eq!(compile_instruction(content, &values, "migration"), first);
    }
}

#[test]
fn test_end_to_end_instruction() {
    let instruction = compile_instruction(
        "Write about {{topic}} in {{setting}}.",
        &bindings(&[("topic", "a robot"), ("setting", "a desert")]),
        "loneliness",
    );

    assert!(instruction.contains("a robot"));
    assert!(instruction.contains("a desert"));
    assert!(instruction.contains("loneliness"));
    assert!(extract_placeholders(&instruction).is_empty());
    assert_eq!(
        instruction,
        "Generate a story based on this topic: \"loneliness\".\n\n\
         Follow these instructions and template:\n\
         Write about a robot in a desert."
    );
}

#[test]
fn test_blank_bindings_cover_every_placeholder() {
    let blank = blank_bindings("{{a}} {{b}} {{a}}");
    assert_eq!(blank.len(), 2);
    assert_eq!(blank.get("a").map(String::as_str), Some(""));
    assert_eq!(blank.get("b").map(String::as_str), Some(""));
}

#[test]
fn test_new_templates_get_distinct_ids() {
    let first = PromptTemplate::new("One", "{{x}}");
    let second = PromptTemplate::new("One", "{{x}}");
    assert_ne!(first.id, second.id);
    assert_eq!(first.placeholders(), vec!["x"]);
}

#[test]
fn test_template_json_shape() {
    let json = r#"[{"id":"1717171717","name":"Fable","content":"A fable about {{animal}}"}]"#;
    let templates: Vec<PromptTemplate> = serde_json::from_str(json).unwrap();
    assert_eq!(templates[0].id.as_str(), "1717171717");
    assert_eq!(templates[0].placeholders(), vec!["animal"]);

    let value = serde_json::to_value(&templates[0]).unwrap();
    assert_eq!(value["id"], "1717171717");
}
