//! 绑定发布/订阅协议
//!
//! 外部容器（静态模块、扩展注册表等）以发布者身份向定位器提供绑定；定位器为每个契约类型
//! 维护一个订阅者，注册时调用 `subscribe` 拉取绑定，移除时调用 `unsubscribe` 收回绑定。

use crate::binding::ErasedBinding;
use infrastructure_common::RawType;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 发布者标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PublisherId(Uuid);

impl PublisherId {
    /// 生成新的发布者标识
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PublisherId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 绑定订阅者
///
/// 每个订阅者只关心一个契约类型；等级由订阅者一侧的排序函数决定。
pub trait BindingSubscriber: Send + Sync {
    /// 关心的契约类型
    fn raw_type(&self) -> RawType;

    /// 接收一个绑定；重复接收同一绑定是无操作
    fn add(&self, binding: ErasedBinding);

    /// 收回一个绑定；不存在时是无操作
    fn remove(&self, binding: &ErasedBinding);

    /// 该订阅者当前持有的、来自此发布者的绑定
    fn bindings(&self) -> Vec<ErasedBinding>;
}

/// 绑定发布者
pub trait BindingPublisher: Send + Sync {
    /// 发布者标识
    fn id(&self) -> PublisherId;

    /// 诊断描述
    fn description(&self) -> String;

    /// 是否可能提供该契约类型的绑定
    fn supplies(&self, _raw_type: RawType) -> bool {
        true
    }

    /// 把匹配订阅者契约类型的绑定推送给订阅者
    fn subscribe(&self, subscriber: Arc<dyn BindingSubscriber>);

    /// 从订阅者收回此发布者的所有绑定
    fn unsubscribe(&self, subscriber: &Arc<dyn BindingSubscriber>);
}

impl fmt::Debug for dyn BindingPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingPublisher")
            .field("id", &self.id())
            .field("description", &self.description())
            .finish()
    }
}
