//! 限定符派生宏与定位器的集成测试

use di_abstractions::{
    AttributeValue, BeanLocator, Binding, Key, MutableBeanLocator, Qualifier, QualifierAnnotation,
};
use di_impl::{DefaultBeanLocator, StaticBindingPublisher};
use qualifier_macros::Qualifier;
use std::sync::Arc;

trait Storage: Send + Sync {
    fn location(&self) -> String;
}

struct Bucket(&'static str);

impl Storage for Bucket {
    fn location(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Debug, Clone, Qualifier)]
struct Region {
    zone: &'static str,
    replicas: i32,
    #[qualifier(skip)]
    #[allow(dead_code)]
    comment: &'static str,
}

#[derive(Debug, Clone, Qualifier)]
struct Archive;

#[derive(Debug, Clone, Qualifier)]
struct Tagged {
    #[qualifier(rename = "value")]
    labels: Vec<&'static str>,
    enabled: bool,
}

fn bucket(location: &'static str) -> Binding<dyn Storage> {
    let instance: Arc<dyn Storage> = Arc::new(Bucket(location));
    Binding::instance(instance)
}

fn locator() -> DefaultBeanLocator {
    let locator = DefaultBeanLocator::new();
    let module = StaticBindingPublisher::builder("storage")
        .bind(bucket("local"))
        .bind(bucket("north").qualified(Region {
            zone: "north",
            replicas: 3,
            comment: "primary",
        }))
        .bind(bucket("south").qualified(Region {
            zone: "south",
            replicas: 1,
            comment: "",
        }))
        .bind(bucket("cold").qualified(Archive))
        .build();
    locator.add(Arc::new(module), 0);
    locator
}

fn locations(locator: &DefaultBeanLocator, key: Key<dyn Storage>) -> Vec<String> {
    locator
        .locate(key)
        .into_iter()
        .map(|entry| entry.value().unwrap().location())
        .collect()
}

#[test]
fn test_derived_attributes() {
    let region = Region {
        zone: "north",
        replicas: 3,
        comment: "ignored",
    };
    let attributes = region.attributes();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes["zone"], AttributeValue::from("north"));
    assert_eq!(attributes["replicas"], AttributeValue::from(3_i32));

    assert!(Archive.attributes().is_empty());

    let tagged = Tagged {
        labels: vec!["a", "b"],
        enabled: true,
    }
    .attributes();
    assert_eq!(tagged["value"], AttributeValue::from(vec!["a", "b"]));
    assert_eq!(tagged["enabled"], AttributeValue::Bool(true));
}

#[test]
fn test_skipped_fields_do_not_affect_equality() {
    let first = Qualifier::from(Region {
        zone: "north",
        replicas: 3,
        comment: "one",
    });
    let second = Qualifier::from(Region {
        zone: "north",
        replicas: 3,
        comment: "two",
    });
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "@Region(replicas=3, zone=\"north\")");
}

#[test]
fn test_locate_by_derived_qualifier() {
    let locator = locator();

    let mut regions = locations(&locator, Key::restricted_by_type::<Region>());
    regions.sort();
    assert_eq!(regions, vec!["north", "south"]);

    assert_eq!(
        locations(
            &locator,
            Key::restricted_by_value(Region {
                zone: "south",
                replicas: 1,
                comment: "anything",
            })
        ),
        vec!["south"]
    );
    assert!(locations(
        &locator,
        Key::restricted_by_value(Region {
            zone: "south",
            replicas: 2,
            comment: "",
        })
    )
    .is_empty());

    assert_eq!(locations(&locator, Key::restricted_by_type::<Archive>()), vec!["cold"]);
    assert_eq!(locations(&locator, Key::named("")), vec!["local"]);
    assert_eq!(locations(&locator, Key::unrestricted()).len(), 4);
}
