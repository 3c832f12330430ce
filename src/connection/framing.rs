/// Splits inbound bytes into LF terminated lines.
///
/// Carriage returns are dropped; each completed line keeps a single `\n`.
/// Bytes after the last LF wait for the next chunk.
#[derive(Debug, Default)]
pub(crate) struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        for &byte in chunk {
            match byte {
                b'\r' => {}
                b'\n' => {
                    let mut line = std::mem::take(&mut self.pending);
                    line.push(b'\n');
                    lines.push(line);
                }
                _ => self.pending.push(byte),
            }
        }
        lines
    }

    pub(crate) fn pending(&self) -> &[u8] {
        &self.pending
    }
}
