//! One-shot startup bootstrapping for embedding hosts.
//!
//! These helpers let a host run manually registered startup hooks exactly
//! once when its context initializes, without any discovery or scanning: the
//! hook is handed the name set the embedder supplied by hand. A hook is the
//! typical place where a connection object holding a
//! [`ConnectionStateGate`](crate::gate::ConnectionStateGate) is later built.
//!
//! 为嵌入宿主提供一次性的启动引导。
//!
//! 这些辅助器让宿主在其上下文初始化时恰好运行一次手动注册的启动钩子，
//! 没有任何发现或扫描：钩子收到的是嵌入者手工提供的名称集合。钩子通常是
//! 之后构建持有 [`ConnectionStateGate`](crate::gate::ConnectionStateGate)
//! 的连接对象的地方。

use crate::error::{Error, HookError, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A startup callback invoked once when the hosting context initializes.
/// 宿主上下文初始化时被调用一次的启动回调。
pub trait StartupHook: Send + Sync {
    /// The hook's name, used in logs and error reports.
    /// 钩子的名称，用于日志和错误报告。
    fn name(&self) -> &str;

    /// Called once with the manually supplied name set and the host context.
    /// 以手动提供的名称集合和宿主上下文被调用一次。
    fn on_startup(
        &self,
        names: &HashSet<String>,
        context: &mut StartupContext,
    ) -> std::result::Result<(), HookError>;
}

/// The context handed to startup hooks: a minimal attribute bag standing in
/// for the embedding host's own context object.
///
/// 交给启动钩子的上下文：一个最小的属性包，代替嵌入宿主自己的上下文对象。
#[derive(Debug, Default)]
pub struct StartupContext {
    attributes: HashMap<String, String>,
}

impl StartupContext {
    /// Creates an empty context.
    /// 创建一个空的上下文。
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an attribute, replacing any previous value under the same key.
    /// 存储一个属性，替换同键下的任何旧值。
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Looks up an attribute by key.
    /// 按键查找属性。
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Receives context lifecycle notifications from the embedding host.
/// 从嵌入宿主接收上下文生命周期通知。
pub trait ContextListener {
    /// The context is initializing; run one-shot setup work.
    /// 上下文正在初始化；执行一次性的设置工作。
    fn context_initialized(&self, context: &mut StartupContext) -> Result<()>;

    /// The context is being torn down. The default does nothing.
    /// 上下文正在销毁。默认什么都不做。
    fn context_destroyed(&self, _context: &mut StartupContext) {}
}

/// Exposes a single [`StartupHook`] as a [`ContextListener`], invoking it
/// once with a manually supplied name set.
///
/// A fault raised by the hook (or by the optional post-init closure) is
/// wrapped into a single [`Error::Startup`] carrying the hook's name.
///
/// 将单个 [`StartupHook`] 作为 [`ContextListener`] 暴露，以手动提供的
/// 名称集合调用它一次。
///
/// 钩子（或可选的初始化后闭包）抛出的故障会被包装成携带钩子名称的单个
/// [`Error::Startup`]。
pub struct HookAsListener {
    hook: Box<dyn StartupHook>,
    names: HashSet<String>,
    init: Option<Box<dyn Fn(&mut StartupContext) -> std::result::Result<(), HookError> + Send + Sync>>,
}

impl HookAsListener {
    /// Wraps `hook` with an initially empty name set.
    /// 用初始为空的名称集合包装 `hook`。
    pub fn new(hook: Box<dyn StartupHook>) -> Self {
        Self {
            hook,
            names: HashSet::new(),
            init: None,
        }
    }

    /// Adds a name to the set handed to the hook on startup.
    /// 向启动时交给钩子的集合中添加一个名称。
    pub fn add_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Registers a closure run after the hook, with the same context.
    /// 注册一个在钩子之后以同一上下文运行的闭包。
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut StartupContext) -> std::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }
}

impl ContextListener for HookAsListener {
    fn context_initialized(&self, context: &mut StartupContext) -> Result<()> {
        debug!(hook = self.hook.name(), names = self.names.len(), "running startup hook");

        self.hook
            .on_startup(&self.names, context)
            .map_err(|source| Error::Startup {
                name: self.hook.name().to_string(),
                source,
            })?;

        if let Some(init) = &self.init {
            init(context).map_err(|source| Error::Startup {
                name: self.hook.name().to_string(),
                source,
            })?;
        }

        Ok(())
    }
}

/// Invokes a list of [`StartupHook`]s in registration order, each with an
/// empty name set, and collects every fault into one [`Error::Aggregate`]
/// instead of stopping at the first.
///
/// 按注册顺序调用一组 [`StartupHook`]，每个都以空的名称集合被调用，并把
/// 所有故障收集到一个 [`Error::Aggregate`] 中，而不是在第一个故障处停止。
pub struct OnStartupListener {
    hooks: Vec<Box<dyn StartupHook>>,
}

impl OnStartupListener {
    /// Creates a listener over the given hooks.
    /// 基于给定的钩子创建一个监听器。
    pub fn new(hooks: Vec<Box<dyn StartupHook>>) -> Self {
        Self { hooks }
    }
}

impl ContextListener for OnStartupListener {
    fn context_initialized(&self, context: &mut StartupContext) -> Result<()> {
        let empty = HashSet::new();
        let mut failures = Vec::new();

        for hook in &self.hooks {
            if let Err(source) = hook.on_startup(&empty, context) {
                warn!(hook = hook.name(), error = %source, "startup hook failed");
                failures.push(Error::Startup {
                    name: hook.name().to_string(),
                    source,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(failures))
        }
    }
}
