use bytemuck::{Pod, Zeroable};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length in bytes of an RGBA8 buffer covering the whole screen.
    pub const fn byte_len(self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    pub const fn row_bytes(self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Byte offset of pixel `(x, y)` in a row-major RGBA8 buffer.
    pub const fn byte_index(self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    pub const fn extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}
