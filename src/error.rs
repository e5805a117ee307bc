//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The fault type a startup hook may raise.
/// 启动钩子可能抛出的故障类型。
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type for the connection lifecycle gate library.
///
/// Rejected phase transitions are deliberately NOT represented here: losing a
/// race on the gate is a routine outcome reported as a boolean, never as an
/// error. Only the bootstrap helpers produce errors.
///
/// 连接生命周期门控库的主要错误类型。
///
/// 被拒绝的阶段转换刻意不在此表示：在门上输掉竞争是以布尔值报告的常规结果，
/// 而不是错误。只有引导辅助器才会产生错误。
#[derive(Debug, Error)]
pub enum Error {
    /// A startup hook failed while the hosting context was initializing.
    /// 宿主上下文初始化时某个启动钩子失败了。
    #[error("startup hook `{name}` failed: {source}")]
    Startup {
        /// The name of the failing hook.
        /// 失败钩子的名称。
        name: String,
        /// The fault raised by the hook.
        /// 钩子抛出的故障。
        #[source]
        source: HookError,
    },

    /// Several startup hooks failed; every individual fault is retained.
    /// 多个启动钩子失败了；每个单独的故障都被保留。
    #[error("{} startup hook(s) failed", .0.len())]
    Aggregate(Vec<Error>),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
