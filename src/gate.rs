//! The atomic lifecycle gate of a single connection.
//! 单个连接的原子生命周期门。

use crate::state::ConnectionPhase;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::trace;

/// Serializes and validates phase advancement for one connection.
///
/// The gate holds exactly one [`ConnectionPhase`] in an atomic cell. Each
/// advance operation is a compare-and-set loop: it only succeeds if the
/// target phase is legally reachable from the phase the gate actually holds
/// at the instant of the swap. Under contention, exactly one caller wins any
/// given transition; every loser gets `false` and mutates nothing.
///
/// Losing is routine, not exceptional: an I/O thread, a handshake thread and
/// a close-initiator thread may all race this object, and a `false` result
/// is the cheap way for a loser to notice it should simply stop. No advance
/// operation ever blocks.
///
/// The gate is created already in `Connecting`; construction is the act of
/// entering the first phase. `Closed` is terminal: once reached, every
/// further advance returns `false`.
///
/// 序列化并验证单个连接的阶段推进。
///
/// 门在一个原子单元中恰好持有一个 [`ConnectionPhase`]。每个推进操作都是一个
/// 比较并交换循环：只有当目标阶段在交换瞬间可以从门实际持有的阶段合法到达时
/// 才会成功。在竞争下，任何给定的转换恰好有一个调用者获胜；每个失败者得到
/// `false` 且不改变任何状态。
///
/// 失败是常规而非异常：I/O线程、握手线程和关闭发起线程都可能竞争此对象，
/// `false` 结果是失败者察觉自己应当停止的廉价方式。任何推进操作都不会阻塞。
///
/// 门在创建时即处于 `Connecting`；构造本身就是进入第一阶段的动作。
/// `Closed` 是终态：一旦到达，之后的每次推进都返回 `false`。
#[derive(Debug)]
pub struct ConnectionStateGate {
    phase: AtomicU8,
}

impl ConnectionStateGate {
    /// Creates a new gate, already in the `Connecting` phase.
    /// 创建一个新的门，已处于 `Connecting` 阶段。
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(ConnectionPhase::Connecting as u8),
        }
    }

    /// Returns a snapshot of the current phase, for diagnostics and logging.
    ///
    /// The value reflects some phase the gate has held at or after the call
    /// began; a concurrent writer may have advanced it again by the time the
    /// caller inspects the result.
    ///
    /// 返回当前阶段的快照，用于诊断和日志记录。
    ///
    /// 该值反映了门在调用开始时或之后持有过的某个阶段；在调用者检视结果时，
    /// 并发的写者可能已再次推进了它。
    pub fn phase(&self) -> ConnectionPhase {
        ConnectionPhase::from_raw(self.phase.load(Ordering::Acquire))
    }

    /// Attempts to advance `Connecting → Connected`.
    ///
    /// Returns `true` if this call caused the transition. Returns `false` if
    /// the gate is already at or past `Connected`.
    ///
    /// 尝试推进 `Connecting → Connected`。
    ///
    /// 若本次调用促成了转换则返回 `true`。若门已处于或越过 `Connected`
    /// 则返回 `false`。
    pub fn advance_to_connected(&self) -> bool {
        self.advance(ConnectionPhase::Connected)
    }

    /// Attempts to advance `Connected → Open`.
    ///
    /// Returns `true` if this call caused the transition. Returns `false` if
    /// the gate is not currently at `Connected`.
    ///
    /// 尝试推进 `Connected → Open`。
    ///
    /// 若本次调用促成了转换则返回 `true`。若门当前不处于 `Connected`
    /// 则返回 `false`。
    pub fn advance_to_open(&self) -> bool {
        self.advance(ConnectionPhase::Open)
    }

    /// Attempts to advance into `Closing`, from `Open` or from `Connected`.
    ///
    /// A connection may need to start closing before it ever opened, e.g.
    /// when the handshake is abandoned, so this transition accepts both
    /// predecessors. Returns `false` if the gate is already closing, closed,
    /// or still in `Connecting`.
    ///
    /// 尝试从 `Open` 或 `Connected` 推进到 `Closing`。
    ///
    /// 连接可能需要在打开之前就开始关闭，例如握手被放弃时，因此该转换接受
    /// 两个前驱。若门已在关闭、已关闭或仍处于 `Connecting` 则返回 `false`。
    pub fn advance_to_closing(&self) -> bool {
        self.advance(ConnectionPhase::Closing)
    }

    /// Attempts to advance into `Closed`, from any phase that is not already
    /// `Closed`.
    ///
    /// This is the abrupt-close edge: a network fault during the handshake,
    /// or a caller-side timeout, may close the connection without ever
    /// passing through `Open` or `Closing`. Returns `false` only when the
    /// gate has already reached `Closed`, so `Closed` is entered exactly
    /// once over the gate's lifetime.
    ///
    /// 尝试从任何尚未 `Closed` 的阶段推进到 `Closed`。
    ///
    /// 这是突然关闭的边：握手期间的网络故障或调用方的超时可以在从未经过
    /// `Open` 或 `Closing` 的情况下关闭连接。只有当门已经到达 `Closed`
    /// 时才返回 `false`，因此在门的生命周期内 `Closed` 恰好被进入一次。
    pub fn advance_to_closed(&self) -> bool {
        self.advance(ConnectionPhase::Closed)
    }

    /// The shared compare-and-set loop behind every advance operation.
    ///
    /// Re-reads the current phase on every failed swap, so a spurious
    /// failure or an interleaved legal transition by another thread is
    /// retried, while an illegal target is reported as `false` without
    /// touching the cell.
    ///
    /// 所有推进操作背后共享的比较并交换循环。
    ///
    /// 每次交换失败后都会重新读取当前阶段，因此伪失败或其他线程交错完成的
    /// 合法转换会被重试，而非法目标则在不触碰单元的情况下报告为 `false`。
    fn advance(&self, target: ConnectionPhase) -> bool {
        let mut current = self.phase.load(Ordering::Acquire);
        loop {
            let phase = ConnectionPhase::from_raw(current);
            if !phase.may_advance_to(target) {
                return false;
            }

            match self.phase.compare_exchange_weak(
                current,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    trace!(
                        from = phase.as_str(),
                        to = target.as_str(),
                        "connection phase advanced"
                    );
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for ConnectionStateGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_in_connecting() {
        let gate = ConnectionStateGate::new();
        assert_eq!(gate.phase(), ConnectionPhase::Connecting);
    }

    #[test]
    fn test_happy_path() {
        let gate = ConnectionStateGate::new();

        assert!(gate.advance_to_connected());
        assert_eq!(gate.phase(), ConnectionPhase::Connected);

        assert!(gate.advance_to_open());
        assert_eq!(gate.phase(), ConnectionPhase::Open);

        assert!(gate.advance_to_closing());
        assert_eq!(gate.phase(), ConnectionPhase::Closing);

        assert!(gate.advance_to_closed());
        assert_eq!(gate.phase(), ConnectionPhase::Closed);
    }

    #[test]
    fn test_no_skipping_forward() {
        let gate = ConnectionStateGate::new();

        // 不能从 Connecting 直接到 Open
        assert!(!gate.advance_to_open());
        assert_eq!(gate.phase(), ConnectionPhase::Connecting);

        // 也不能直接到 Closing
        assert!(!gate.advance_to_closing());
        assert_eq!(gate.phase(), ConnectionPhase::Connecting);
    }

    #[test]
    fn test_each_transition_wins_once() {
        let gate = ConnectionStateGate::new();

        assert!(gate.advance_to_connected());
        assert!(!gate.advance_to_connected());
        assert_eq!(gate.phase(), ConnectionPhase::Connected);

        assert!(gate.advance_to_open());
        assert!(!gate.advance_to_open());
        assert_eq!(gate.phase(), ConnectionPhase::Open);
    }

    #[test]
    fn test_closing_from_connected() {
        let gate = ConnectionStateGate::new();
        assert!(gate.advance_to_connected());

        // 握手从未完成，连接仍然可以开始关闭
        assert!(gate.advance_to_closing());
        assert_eq!(gate.phase(), ConnectionPhase::Closing);

        // Open 现在不可达了
        assert!(!gate.advance_to_open());
        assert_eq!(gate.phase(), ConnectionPhase::Closing);
    }

    #[test]
    fn test_abrupt_close_from_connected() {
        let gate = ConnectionStateGate::new();
        assert!(gate.advance_to_connected());

        // 跳过 Open 和 Closing，直接突然关闭
        assert!(gate.advance_to_closed());
        assert_eq!(gate.phase(), ConnectionPhase::Closed);
    }

    #[test]
    fn test_abrupt_close_from_connecting() {
        let gate = ConnectionStateGate::new();

        // 握手还没开始就失败了
        assert!(gate.advance_to_closed());
        assert_eq!(gate.phase(), ConnectionPhase::Closed);
    }

    #[test]
    fn test_closed_is_terminal() {
        let gate = ConnectionStateGate::new();
        assert!(gate.advance_to_closed());

        // 之后的任何推进都失败，阶段保持 Closed
        assert!(!gate.advance_to_connected());
        assert!(!gate.advance_to_open());
        assert!(!gate.advance_to_closing());
        assert!(!gate.advance_to_closed());
        assert_eq!(gate.phase(), ConnectionPhase::Closed);
    }

    #[test]
    fn test_default_matches_new() {
        let gate = ConnectionStateGate::default();
        assert_eq!(gate.phase(), ConnectionPhase::Connecting);
    }
}
