use mustache_core::render;
use mustache_core::value::Value;

fn map(pairs: Vec<(&str, Value)>) -> Value {
    Value::Map(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn renders_a_small_profile_card() {
    let mut skills = Vec::new();
    for name in ["rust", "systems", "compilers"] {
        skills.push(Value::Str(name.to_string()));
    }
    let data = map(vec![
        ("name", Value::Str("Ada Lovelace".into())),
        ("title", Value::Str("Analyst".into())),
        ("skills", Value::Array(skills)),
        ("bio", Value::Str("Wrote the first algorithm & loved it.".into())),
    ]);

    let template = "# {{name}}\n{{title}}\n{{#skills}}- {{.}}\n{{/skills}}\n{{bio}}";
    let output = render(template, &data).unwrap();

    insta::assert_snapshot!(
        output,
        @"# Ada Lovelace\nAnalyst\n- rust\n- systems\n- compilers\nWrote the first algorithm &amp; loved it."
    );
}
