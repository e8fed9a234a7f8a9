/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Re-chunking of an upstream body into fixed-size blocks.

use bytes::{Bytes, BytesMut};

/// Default relay block: 25 pages of 4 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 25 * 4096;

/// Accumulates arbitrary chunks and releases them as `block_size` blocks.
#[derive(Debug)]
pub struct BlockBuffer {
    block_size: usize,
    pending: BytesMut,
}

impl BlockBuffer {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_size,
            pending: BytesMut::with_capacity(block_size),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes held back until a block fills up.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Adds a chunk and returns every block it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.pending.extend_from_slice(chunk);
        let mut blocks = Vec::with_capacity(self.pending.len() / self.block_size);
        while self.pending.len() >= self.block_size {
            blocks.push(self.pending.split_to(self.block_size).freeze());
        }
        blocks
    }

    /// The short trailing block of a body that ended cleanly.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.split().freeze())
        }
    }

    /// Throws away the incomplete block of a body that failed; returns its length.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::BlockBuffer;

    #[test]
    fn releases_only_full_blocks() {
        let mut buffer = BlockBuffer::new(4);

        assert!(buffer.push(b"ab").is_empty());
        let blocks = buffer.push(b"cdefghij");

        assert_eq!(blocks.len(), 2);
        assert_eq!(&blocks[0][..], b"abcd");
        assert_eq!(&blocks[1][..], b"efgh");
        assert_eq!(buffer.pending_len(), 2);
    }

    #[test]
    fn finish_flushes_the_tail() {
        let mut buffer = BlockBuffer::new(4);
        buffer.push(b"abcdef");

        assert_eq!(buffer.finish().as_deref(), Some(&b"ef"[..]));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn discard_drops_the_tail() {
        let mut buffer = BlockBuffer::new(4);
        buffer.push(b"abcdef");

        assert_eq!(buffer.discard(), 2);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn zero_block_size_is_clamped() {
        let mut buffer = BlockBuffer::new(0);

        assert_eq!(buffer.block_size(), 1);
        assert_eq!(buffer.push(b"xy").len(), 2);
    }
}
