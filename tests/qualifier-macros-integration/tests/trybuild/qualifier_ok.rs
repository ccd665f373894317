use di_abstractions::{AttributeValue, QualifierAnnotation};
use qualifier_macros::Qualifier;

#[derive(Qualifier)]
struct Region {
    zone: &'static str,
    #[qualifier(rename = "tier")]
    level: i32,
    #[qualifier(skip)]
    #[allow(dead_code)]
    note: String,
}

fn main() {
    let region = Region {
        zone: "north",
        level: 2,
        note: String::new(),
    };
    let attributes = region.attributes();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["zone"], AttributeValue::from("north"));
    assert_eq!(attributes["tier"], AttributeValue::from(2_i32));
}
