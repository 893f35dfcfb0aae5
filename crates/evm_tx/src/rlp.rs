//! Minimal RLP encoder, just enough for flat transaction lists.

use primitive_types::U256;

/// Accumulates the payload of a single flat RLP list.
#[derive(Debug, Default)]
pub struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        encode_bytes(&mut self.payload, bytes);
        self
    }

    /// Integers are encoded big-endian with leading zeros stripped; zero is
    /// the empty string.
    pub fn append_uint(&mut self, value: U256) -> &mut Self {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        let first = buf.iter().position(|b| *b != 0).unwrap_or(32);
        encode_bytes(&mut self.payload, &buf[first..]);
        self
    }

    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.append_uint(U256::from(value))
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        encode_header(&mut out, 0xc0, self.payload.len());
        out.extend_from_slice(&self.payload);
        out
    }
}

fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
        return;
    }
    encode_header(out, 0x80, bytes.len());
    out.extend_from_slice(bytes);
}

fn encode_header(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len <= 55 {
        out.push(offset + len as u8);
        return;
    }
    let len_bytes = (len as u64).to_be_bytes();
    let first = len_bytes.iter().position(|b| *b != 0).unwrap_or(7);
    let len_of_len = len_bytes.len() - first;
    out.push(offset + 55 + len_of_len as u8);
    out.extend_from_slice(&len_bytes[first..]);
}
