//! Owned RGBA pixel storage.

/// One pixel, `[r, g, b, a]`.
pub type Rgba = [u8; 4];

/// Transparent black, returned for out-of-range reads.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// `width * height` pixels, row-major from the top-left, 4 bytes each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Reallocates for the new size; contents are cleared to transparent black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize * 4, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some((y as usize * self.width as usize + x as usize) * 4)
        } else {
            None
        }
    }

    /// Pixel at (x, y), or [`TRANSPARENT`] when out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Rgba {
        match self.index(x, y) {
            Some(i) => [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]],
            None => TRANSPARENT,
        }
    }

    /// Writes (x, y). Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, rgba: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Fills columns `x_start..=x_end` of row `y`, clamped to the buffer.
    #[inline]
    pub fn fill_span(&mut self, y: i32, x_start: i32, x_end: i32, rgba: Rgba) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x_start = x_start.max(0);
        let x_end = x_end.min(self.width as i32 - 1);
        if x_start > x_end {
            return;
        }

        let row = y as usize * self.width as usize;
        let begin = (row + x_start as usize) * 4;
        let end = (row + x_end as usize + 1) * 4;
        for pixel in self.data[begin..end].chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    pub fn fill(&mut self, rgba: Rgba) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_access_is_ignored() {
        let mut buffer = PixelBuffer::new(4, 3);
        buffer.set(-1, 0, [1, 2, 3, 4]);
        buffer.set(4, 0, [1, 2, 3, 4]);
        buffer.set(0, 3, [1, 2, 3, 4]);
        assert!(buffer.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(buffer.get(10, 10), TRANSPARENT);
    }

    #[test]
    fn span_is_clamped() {
        let mut buffer = PixelBuffer::new(4, 2);
        buffer.fill_span(1, -5, 100, [9, 9, 9, 255]);
        assert_eq!(buffer.get(0, 1), [9, 9, 9, 255]);
        assert_eq!(buffer.get(3, 1), [9, 9, 9, 255]);
        assert_eq!(buffer.get(0, 0), TRANSPARENT);
    }

    #[test]
    fn resize_clears() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.fill([255; 4]);
        buffer.resize(3, 1);
        assert_eq!(buffer.as_bytes().len(), 12);
        assert!(buffer.as_bytes().iter().all(|b| *b == 0));
    }
}
