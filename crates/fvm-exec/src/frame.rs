use alloy_primitives::{Address, B256};

use crate::{CallKind, ExecutionContext};

/// Identity of a frame currently running in the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// The frame's hash.
    pub transaction_hash: B256,
    /// The account the frame runs in.
    pub address: Address,
    /// The frame's depth.
    pub depth: u32,
    /// The frame's kind.
    pub kind: CallKind,
}

impl From<&ExecutionContext> for FrameInfo {
    fn from(context: &ExecutionContext) -> Self {
        Self {
            transaction_hash: context.transaction_hash,
            address: context.destination,
            depth: context.depth,
            kind: context.kind,
        }
    }
}

/// The stack of frames running in the interpreter, owned by one dispatcher.
///
/// A frame is pushed right before the interpreter starts on it and popped as soon as the
/// interpreter returns, so the stack mirrors the interpreter's own call stack. It also hands out
/// the transaction-wide positions of internal transactions.
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<FrameInfo>,
    internal_transactions: u32,
}

impl FrameStack {
    /// Pushes a frame entering the interpreter.
    pub fn push(&mut self, frame: FrameInfo) {
        self.frames.push(frame);
    }

    /// Pops the frame the interpreter just left.
    pub fn pop(&mut self) -> Option<FrameInfo> {
        self.frames.pop()
    }

    /// Returns the position of the next internal transaction and reserves it.
    pub fn next_internal_index(&mut self) -> u32 {
        let index = self.internal_transactions;
        self.internal_transactions += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(depth: u32) -> FrameInfo {
        FrameInfo {
            transaction_hash: B256::ZERO,
            address: Address::ZERO,
            depth,
            kind: CallKind::Call,
        }
    }

    #[test]
    fn test_frames_are_lifo() {
        let mut stack = FrameStack::default();
        stack.push(frame(0));
        stack.push(frame(1));
        assert_eq!(stack.pop().map(|f| f.depth), Some(1));
        assert_eq!(stack.pop().map(|f| f.depth), Some(0));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_internal_indices_are_sequential() {
        let mut stack = FrameStack::default();
        assert_eq!(stack.next_internal_index(), 0);
        assert_eq!(stack.next_internal_index(), 1);
        assert_eq!(stack.next_internal_index(), 2);
    }
}
