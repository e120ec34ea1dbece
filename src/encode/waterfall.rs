/// Scrolling grayscale image of recent output rows, newest at the top.
pub struct Waterfall {
    width: usize,
    rows: usize,
    pixels: Vec<u8>,
}

impl Waterfall {
    pub fn new(width: usize, rows: usize) -> Self {
        let rows = rows.max(1);
        Self {
            width,
            rows,
            pixels: vec![0; width * rows],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Scroll everything down one row and put `row` on top. Short rows are
    /// zero-padded, long rows truncated.
    pub fn push_row(&mut self, row: &[u8]) {
        let w = self.width;
        self.pixels.copy_within(0..w * (self.rows - 1), w);
        let top = &mut self.pixels[..w];
        let n = row.len().min(w);
        top[..n].copy_from_slice(&row[..n]);
        top[n..].fill(0);
    }

    pub fn image(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_row_on_top() {
        let mut wf = Waterfall::new(3, 2);
        wf.push_row(&[1, 2, 3]);
        assert_eq!(wf.image(), &[1, 2, 3, 0, 0, 0]);
        wf.push_row(&[4, 5, 6]);
        assert_eq!(wf.image(), &[4, 5, 6, 1, 2, 3]);
        wf.push_row(&[7, 8, 9]);
        assert_eq!(wf.image(), &[7, 8, 9, 4, 5, 6]);
    }

    #[test]
    fn mismatched_rows_are_fitted() {
        let mut wf = Waterfall::new(3, 1);
        wf.push_row(&[9]);
        assert_eq!(wf.image(), &[9, 0, 0]);
        wf.push_row(&[1, 2, 3, 4]);
        assert_eq!(wf.image(), &[1, 2, 3]);
        assert_eq!(wf.rows(), 1);
    }
}
