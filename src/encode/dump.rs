use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Raw texture dump: one `width`-byte row per frame, no header.
pub struct TextureDump {
    writer: BufWriter<File>,
    rows: usize,
}

impl TextureDump {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create texture dump: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn write_row(&mut self, row: &[u8]) -> Result<()> {
        self.writer.write_all(row).context("Failed to write texture row")?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().context("Failed to flush texture dump")?;
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_concatenated() {
        let path = std::env::temp_dir().join(format!("spectex-dump-{}.u8", std::process::id()));
        let mut dump = TextureDump::create(&path).unwrap();
        dump.write_row(&[1, 2]).unwrap();
        dump.write_row(&[3, 4]).unwrap();
        assert_eq!(dump.finish().unwrap(), 2);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }
}
