//! Defines the lifecycle phases of a connection.
//! 定义连接的生命周期阶段。

/// One discrete stage of a connection's lifecycle.
///
/// Phases form a fixed forward-only sequence:
/// `Connecting → Connected → Open → Closing → Closed`.
/// The close-side phases are reachable early: a connection that fails during
/// the handshake may move to `Closing` from `Connected`, or straight to
/// `Closed` from any phase. `Closed` is terminal.
///
/// The `Ord` derive follows declaration order, so observers can assert that
/// the phase they read never moves backward.
///
/// 连接生命周期中的一个离散阶段。
///
/// 阶段构成固定的单向序列：
/// `Connecting → Connected → Open → Closing → Closed`。
/// 关闭侧的阶段可以提前到达：在握手期间失败的连接可以从 `Connected` 进入
/// `Closing`，或从任意阶段直接进入 `Closed`。`Closed` 是终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ConnectionPhase {
    /// The transport is being set up; nothing has completed yet.
    /// 传输正在建立中；尚未完成任何步骤。
    Connecting = 0,

    /// The underlying transport is connected, the upgrade handshake is not
    /// finished.
    /// 底层传输已连接，升级握手尚未完成。
    Connected = 1,

    /// The handshake completed; application traffic may flow.
    /// 握手已完成；应用数据可以流动。
    Open = 2,

    /// A close has been initiated and is in progress.
    /// 关闭已发起并正在进行。
    Closing = 3,

    /// The connection is fully closed. No further transitions are possible.
    /// 连接已完全关闭。不可能再有任何转换。
    Closed = 4,
}

impl ConnectionPhase {
    /// Decodes a raw discriminant read back out of the gate's atomic cell.
    /// The cell only ever stores values produced by `as u8` on this enum.
    ///
    /// 解码从门的原子单元中读回的原始判别值。
    /// 该单元只会存储由本枚举 `as u8` 产生的值。
    pub(crate) const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Connected,
            2 => Self::Open,
            3 => Self::Closing,
            _ => Self::Closed,
        }
    }

    /// Returns whether a transition from this phase into `target` is legal.
    ///
    /// The forward happy path is strict (exactly one predecessor per phase).
    /// The close side is permissive: `Closing` is reachable from `Open` or
    /// `Connected`, and `Closed` from any phase that is not already `Closed`.
    /// Same-phase and backward transitions are never legal.
    ///
    /// 返回从当前阶段转换到 `target` 是否合法。
    ///
    /// 正向路径是严格的（每个阶段恰好一个前驱）。关闭侧是宽松的：
    /// `Closing` 可从 `Open` 或 `Connected` 到达，`Closed` 可从任何
    /// 尚未 `Closed` 的阶段到达。同阶段和逆向转换永远不合法。
    pub fn may_advance_to(self, target: ConnectionPhase) -> bool {
        use ConnectionPhase::*;

        match (self, target) {
            // The strict forward path.
            // 严格的正向路径。
            (Connecting, Connected) => true,
            (Connected, Open) => true,

            // Closing may begin before the connection ever opened, e.g. a
            // handshake that is abandoned mid-flight.
            // 关闭可以在连接打开之前开始，例如握手中途被放弃。
            (Open, Closing) | (Connected, Closing) => true,

            // An abrupt close is legal from anywhere, but Closed is terminal.
            // 突然关闭从任何地方都合法，但 Closed 是终态。
            (current, Closed) => current != Closed,

            // All other transitions are invalid.
            // 其他转换都是无效的。
            _ => false,
        }
    }

    /// Returns whether this phase has no outgoing transitions.
    /// 返回此阶段是否没有出边。
    pub fn is_terminal(self) -> bool {
        self == ConnectionPhase::Closed
    }

    /// Gets the string representation of this phase, for logging.
    /// 获取此阶段的字符串表示，用于日志记录。
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionPhase::Connecting => "Connecting",
            ConnectionPhase::Connected => "Connected",
            ConnectionPhase::Open => "Open",
            ConnectionPhase::Closing => "Closing",
            ConnectionPhase::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionPhase::*;

    #[test]
    fn test_forward_path_is_strict() {
        // 正常的建立流程
        assert!(Connecting.may_advance_to(Connected));
        assert!(Connected.may_advance_to(Open));

        // 不允许跳过阶段
        assert!(!Connecting.may_advance_to(Open));
        assert!(!Connecting.may_advance_to(Closing));
        assert!(!Connected.may_advance_to(Connected));

        // 不允许逆向转换
        assert!(!Open.may_advance_to(Connected));
        assert!(!Closing.may_advance_to(Open));
    }

    #[test]
    fn test_close_side_is_permissive() {
        // Closing 可以从 Open 或 Connected 到达
        assert!(Open.may_advance_to(Closing));
        assert!(Connected.may_advance_to(Closing));
        assert!(!Connecting.may_advance_to(Closing));

        // Closed 可以从任何更早的阶段到达
        assert!(Connecting.may_advance_to(Closed));
        assert!(Connected.may_advance_to(Closed));
        assert!(Open.may_advance_to(Closed));
        assert!(Closing.may_advance_to(Closed));
    }

    #[test]
    fn test_closed_is_terminal() {
        for target in [Connecting, Connected, Open, Closing, Closed] {
            assert!(!Closed.may_advance_to(target));
        }
        assert!(Closed.is_terminal());
        assert!(!Open.is_terminal());
    }

    #[test]
    fn test_phase_ordering_matches_lifecycle() {
        assert!(Connecting < Connected);
        assert!(Connected < Open);
        assert!(Open < Closing);
        assert!(Closing < Closed);
    }

    #[test]
    fn test_raw_round_trip() {
        for phase in [Connecting, Connected, Open, Closing, Closed] {
            assert_eq!(ConnectionPhase::from_raw(phase as u8), phase);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionPhase::Connecting.to_string(), "Connecting");
        assert_eq!(format!("{}", ConnectionPhase::Closed), "Closed");
    }
}
