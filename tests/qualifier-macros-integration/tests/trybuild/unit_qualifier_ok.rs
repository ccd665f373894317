use di_abstractions::QualifierAnnotation;
use qualifier_macros::Qualifier;

#[derive(Qualifier)]
struct Primary;

fn main() {
    assert!(Primary.attributes().is_empty());
}
