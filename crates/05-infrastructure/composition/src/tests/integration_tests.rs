//! 启动器集成测试

use crate::{BootstrapError, Environment, LocatorBootstrapper, RankedPublisher, StaticEnvironment};
use async_trait::async_trait;
use di_abstractions::{mediator_fn, BeanEntry, BeanLocator, Binding, BindingPublisher, Key};
use di_impl::{DynamicBindingPublisher, StaticBindingPublisher};
use infrastructure_common::{BootstrapResult, ConfigError, LocatorSettings};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;

fn module(name: &str, value: &str) -> Arc<dyn BindingPublisher> {
    Arc::new(
        StaticBindingPublisher::builder(name)
            .bind(Binding::<String>::instance(Arc::new(value.to_string())))
            .build(),
    )
}

fn values(runtime: &crate::LocatorRuntime) -> Vec<String> {
    runtime
        .locator()
        .locate(Key::<String>::unrestricted())
        .into_iter()
        .map(|entry| entry.value().unwrap().to_string())
        .collect()
}

/// 发现失败的环境
struct BrokenEnvironment;

#[async_trait]
impl Environment for BrokenEnvironment {
    fn name(&self) -> &str {
        "broken"
    }

    async fn publishers(&self) -> BootstrapResult<Vec<RankedPublisher>> {
        Err(BootstrapError::EnvironmentFailed {
            environment: self.name().to_string(),
            message: "registry unavailable".to_string(),
        })
    }
}

/// 异步发现发布者的环境
struct DeferredEnvironment {
    publisher: Arc<dyn BindingPublisher>,
}

#[async_trait]
impl Environment for DeferredEnvironment {
    fn name(&self) -> &str {
        "deferred"
    }

    async fn publishers(&self) -> BootstrapResult<Vec<RankedPublisher>> {
        tokio::task::yield_now().await;
        Ok(vec![RankedPublisher::new(self.publisher.clone()).with_rank(7)])
    }
}

#[tokio::test]
async fn test_bootstrap_registers_environment_publishers() {
    let runtime = LocatorBootstrapper::new()
        .with_settings(LocatorSettings::default())
        .add_environment(
            StaticEnvironment::new("in-process")
                .with_publisher(module("base", "base"))
                .with_ranked_publisher(module("override", "override"), 3),
        )
        .add_environment(DeferredEnvironment {
            publisher: module("deferred", "deferred"),
        })
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(values(&runtime), vec!["deferred", "override", "base"]);
    let ranks: Vec<i32> = runtime.locator().publishers().iter().map(|info| info.rank).collect();
    assert_eq!(ranks, vec![7, 3, 0]);
    assert!(!runtime.is_stopped());
}

#[tokio::test]
async fn test_default_rank_comes_from_settings() {
    let settings = LocatorSettings {
        default_rank: 42,
        ..LocatorSettings::default()
    };
    let runtime = LocatorBootstrapper::new()
        .with_settings(settings)
        .add_environment(StaticEnvironment::new("in-process").with_publisher(module("m", "m")))
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(runtime.settings().default_rank, 42);
    assert_eq!(runtime.locator().publishers()[0].rank, 42);
}

#[tokio::test]
async fn test_duplicate_publishers_are_ignored() {
    let shared = module("shared", "shared");
    let runtime = LocatorBootstrapper::new()
        .with_settings(LocatorSettings::default())
        .add_environment(StaticEnvironment::new("first").with_publisher(shared.clone()))
        .add_environment(StaticEnvironment::new("second").with_ranked_publisher(shared, 9))
        .bootstrap()
        .await
        .unwrap();

    let publishers = runtime.locator().publishers();
    assert_eq!(publishers.len(), 1);
    assert_eq!(publishers[0].rank, 0);
}

#[tokio::test]
async fn test_failing_environment_aborts_bootstrap() {
    let result = LocatorBootstrapper::new()
        .with_settings(LocatorSettings::default())
        .add_environment(BrokenEnvironment)
        .bootstrap()
        .await;

    match result {
        Err(BootstrapError::EnvironmentFailed { environment, .. }) => {
            assert_eq!(environment, "broken");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let mut settings = LocatorSettings::default();
    settings.logging.filter = "  ".to_string();

    let result = LocatorBootstrapper::new()
        .with_settings(settings)
        .bootstrap()
        .await;
    assert!(matches!(
        result,
        Err(BootstrapError::ConfigError {
            source: ConfigError::ValidationError { .. }
        })
    ));
}

#[tokio::test]
async fn test_settings_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "default_rank = -4\n\n[logging]\nfilter = \"debug\"").unwrap();

    let runtime = LocatorBootstrapper::new()
        .with_settings_file(file.path())
        .add_environment(StaticEnvironment::new("in-process").with_publisher(module("m", "m")))
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(runtime.settings().logging.filter, "debug");
    assert_eq!(runtime.locator().publishers()[0].rank, -4);
}

#[tokio::test]
async fn test_missing_settings_file_is_reported() {
    let result = LocatorBootstrapper::new()
        .with_settings_file("/nonexistent/locator.toml")
        .bootstrap()
        .await;
    assert!(matches!(
        result,
        Err(BootstrapError::ConfigError {
            source: ConfigError::FileNotFound { .. }
        })
    ));
}

#[tokio::test]
async fn test_shutdown_clears_publishers_and_watches() {
    let extensions = Arc::new(DynamicBindingPublisher::new("extensions"));
    extensions.publish(Binding::<String>::instance(Arc::new("plugin".to_string())));

    let runtime = LocatorBootstrapper::new()
        .with_settings(LocatorSettings::default())
        .add_environment(StaticEnvironment::new("extensions").with_publisher(extensions.clone()))
        .bootstrap()
        .await
        .unwrap();

    let removes = Arc::new(AtomicUsize::new(0));
    let counter = removes.clone();
    let handle = runtime.locator().watch(
        Key::<String>::unrestricted(),
        mediator_fn(
            |_: &BeanEntry<String>, _: &()| Ok(()),
            move |_: &BeanEntry<String>, _: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ),
        (),
    );
    assert_eq!(runtime.locator().watch_count(), 1);

    runtime.shutdown();
    runtime.shutdown();
    assert!(runtime.is_stopped());
    assert_eq!(removes.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.locator().watch_count(), 0);
    assert!(values(&runtime).is_empty());
    assert_eq!(extensions.subscriber_count(), 0);
    handle.cancel();
}
